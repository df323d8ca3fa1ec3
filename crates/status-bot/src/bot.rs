//! The status bot context: ledger, ignore policy, and chat transport.
//!
//! One `StatusBot` is built at startup and shared (via `Arc`) by the event
//! loop, the backfill pass, and the daily scheduler. All ledger access goes
//! through [`StatusBot::handle_message`] and [`StatusBot::close_cycle`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::{stream, StreamExt};
use reporting::{
    extract_identity, not_reported, CycleDecision, IgnorePolicy, ReportLedger, Summary,
};
use tracing::{debug, info, warn};

use crate::error::TransportResult;
use crate::transport::ChatTransport;

/// Profile lookups kept in flight while building a summary.
const RESOLVE_CONCURRENCY: usize = 4;

/// What happened to a single inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// First report from this member in the current cycle.
    Recorded { user_id: String },
    /// The member had already reported this cycle.
    AlreadyRecorded { user_id: String },
    /// The member is on the ignore list.
    Ignored { user_id: String },
    /// The message names nobody; not a status report.
    Unresolved,
}

impl MessageOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// What happened when the daily trigger closed a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Posted(Summary),
    /// Weekend: the ledger was drained but nothing was posted.
    SkippedWeekend { discarded: usize },
}

pub struct StatusBot {
    ledger: ReportLedger,
    ignored: IgnorePolicy,
    transport: Arc<dyn ChatTransport>,
}

impl StatusBot {
    pub fn new(transport: Arc<dyn ChatTransport>, ignored: IgnorePolicy) -> Self {
        Self {
            ledger: ReportLedger::new(),
            ignored,
            transport,
        }
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Number of members recorded so far this cycle.
    pub fn pending_reports(&self) -> usize {
        self.ledger.len()
    }

    /// Interpret one chat message and record its author's report.
    ///
    /// The member's profile is resolved before recording so that ignore-list
    /// entries may name either the user ID or the display name. A failed
    /// lookup is returned to the caller, which logs it and moves on.
    pub async fn handle_message(
        &self,
        sender: &str,
        text: &str,
    ) -> TransportResult<MessageOutcome> {
        let Some(user_id) = extract_identity(sender, text) else {
            debug!("Message names no reporter, skipping");
            return Ok(MessageOutcome::Unresolved);
        };
        let user_id = user_id.to_string();

        if self.ignored.contains(&user_id) {
            debug!(user = %user_id, "Ignoring report from ignored user");
            return Ok(MessageOutcome::Ignored { user_id });
        }

        let display_name = self.transport.resolve_display_name(&user_id).await?;
        if self.ignored.contains(&display_name) {
            debug!(user = %user_id, name = %display_name, "Ignoring report from ignored user");
            return Ok(MessageOutcome::Ignored { user_id });
        }

        if self.ledger.report(&user_id) {
            info!(user = %user_id, name = %display_name, "User reported status");
            Ok(MessageOutcome::Recorded { user_id })
        } else {
            debug!(user = %user_id, "User already reported this cycle");
            Ok(MessageOutcome::AlreadyRecorded { user_id })
        }
    }

    /// Close the cycle that ends at `now`: drain the ledger and, on working
    /// days, post the summary.
    pub async fn close_cycle(&self, now: DateTime<Utc>) -> TransportResult<CycleOutcome> {
        let reported = self.ledger.snapshot_and_clear();

        if !CycleDecision::at(now).should_post() {
            info!(discarded = reported.len(), "It's the weekend, not sending summary message");
            return Ok(CycleOutcome::SkippedWeekend {
                discarded: reported.len(),
            });
        }

        info!(reported = reported.len(), "Sending summary message");
        let summary = self.build_summary(now.date_naive(), &reported).await;
        self.transport.post_summary(&summary).await?;
        Ok(CycleOutcome::Posted(summary))
    }

    /// Reconcile `reported` user IDs against the live roster and resolve
    /// everyone to display names.
    async fn build_summary(&self, date: NaiveDate, reported: &[String]) -> Summary {
        let roster = match self.transport.fetch_channel_members().await {
            Ok(members) => members,
            Err(e) => {
                warn!(error = %e, "Error getting users in conversation");
                Vec::new()
            }
        };

        let mut ids: Vec<&str> = reported.iter().map(String::as_str).collect();
        ids.extend(roster.iter().map(String::as_str));
        ids.sort_unstable();
        ids.dedup();
        let names = self.resolve_names(&ids).await;
        let name_of = |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());

        let roster: Vec<&String> = roster
            .iter()
            .filter(|id| !self.ignored.matches_member(id.as_str(), &name_of(id.as_str())))
            .collect();

        let absent = not_reported(reported, &roster)
            .iter()
            .map(|id| name_of(id.as_str()))
            .collect();

        let mut present: Vec<String> = reported.iter().map(|id| name_of(id.as_str())).collect();
        present.sort();

        Summary::new(date, present, absent)
    }

    /// Display names for `ids`; unresolvable members map to their raw ID.
    async fn resolve_names(&self, ids: &[&str]) -> HashMap<String, String> {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        stream::iter(ids)
            .map(|id: String| async move {
                let name = match self.transport.resolve_display_name(&id).await {
                    Ok(name) if !name.trim().is_empty() => name,
                    Ok(_) => id.clone(),
                    Err(e) => {
                        warn!(user = %id, error = %e, "Error getting user info");
                        id.clone()
                    }
                };
                (id, name)
            })
            .buffered(RESOLVE_CONCURRENCY)
            .collect()
            .await
    }
}
