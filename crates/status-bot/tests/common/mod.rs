//! Shared test doubles for the status bot.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reporting::Summary;
use status_bot::{ChatTransport, HistoryMessage, TransportError, TransportResult};

/// In-memory chat platform that records what the bot asked of it.
#[derive(Default)]
pub struct RecordingTransport {
    names: Mutex<HashMap<String, String>>,
    members: Mutex<Vec<String>>,
    history: Mutex<Vec<HistoryMessage>>,
    fail_members: AtomicBool,
    fail_history: AtomicBool,
    fail_post: AtomicBool,
    pub posted: Mutex<Vec<Summary>>,
    pub history_requests: Mutex<Vec<(DateTime<Utc>, usize)>>,
    pub lookups: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, name: &str) -> Self {
        self.names
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_members(self, ids: &[&str]) -> Self {
        *self.members.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_history(self, messages: Vec<HistoryMessage>) -> Self {
        *self.history.lock().unwrap() = messages;
        self
    }

    pub fn failing_members(self) -> Self {
        self.fail_members.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_history(self) -> Self {
        self.fail_history.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_post(self) -> Self {
        self.fail_post.store(true, Ordering::SeqCst);
        self
    }

    pub fn posted(&self) -> Vec<Summary> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn fetch_channel_members(&self) -> TransportResult<Vec<String>> {
        if self.fail_members.load(Ordering::SeqCst) {
            return Err(TransportError::api("conversations.members", "channel_not_found"));
        }
        Ok(self.members.lock().unwrap().clone())
    }

    async fn resolve_display_name(&self, user_id: &str) -> TransportResult<String> {
        self.lookups.lock().unwrap().push(user_id.to_string());
        self.names
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| TransportError::api("users.info", "user_not_found"))
    }

    async fn post_summary(&self, summary: &Summary) -> TransportResult<()> {
        if self.fail_post.load(Ordering::SeqCst) {
            return Err(TransportError::api("chat.postMessage", "not_in_channel"));
        }
        self.posted.lock().unwrap().push(summary.clone());
        Ok(())
    }

    async fn fetch_recent_history(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> TransportResult<Vec<HistoryMessage>> {
        self.history_requests.lock().unwrap().push((since, limit));
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(TransportError::api("conversations.history", "ratelimited"));
        }
        Ok(self.history.lock().unwrap().clone())
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Tuesday 2024-03-05, 23:55 UTC.
pub fn weekday_trigger() -> DateTime<Utc> {
    utc(2024, 3, 5, 23, 55)
}

/// Saturday 2024-03-09, 23:55 UTC.
pub fn weekend_trigger() -> DateTime<Utc> {
    utc(2024, 3, 9, 23, 55)
}
