//! The seam between the bot and its chat platform.
//!
//! `SlackClient` implements [`ChatTransport`] against the Slack Web API. Tests
//! provide recording fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reporting::Summary;

use crate::error::TransportResult;

/// One message read back from channel history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryMessage {
    /// Author's user ID; empty for integration posts.
    pub sender: String,
    pub text: String,
}

impl HistoryMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// A live message event delivered by the event transport.
pub type MessageEvent = HistoryMessage;

/// Outbound operations the bot needs from the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// User IDs of everyone currently in the monitored channel, in roster order.
    async fn fetch_channel_members(&self) -> TransportResult<Vec<String>>;

    /// Human-readable name for a user ID.
    async fn resolve_display_name(&self, user_id: &str) -> TransportResult<String>;

    /// Post the formatted end-of-day summary to the monitored channel.
    async fn post_summary(&self, summary: &Summary) -> TransportResult<()>;

    /// Up to `limit` channel messages posted at or after `since`.
    async fn fetch_recent_history(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> TransportResult<Vec<HistoryMessage>>;
}
