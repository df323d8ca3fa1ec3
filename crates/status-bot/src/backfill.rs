//! Startup backfill: rebuild today's ledger from channel history.
//!
//! The ledger lives in memory only, so a restart mid-day forgets who already
//! reported. Before the live event loop starts, today's messages (UTC) are
//! replayed through the same path as live events. Failures never abort
//! startup; the worst case is an empty ledger.

use chrono::{DateTime, Utc};
use reporting::start_of_day;
use tracing::{error, info, warn};

use crate::bot::StatusBot;

/// Counts from one backfill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Messages returned by the history fetch.
    pub fetched: usize,
    /// Messages that added a new member to the ledger.
    pub recorded: usize,
    /// Messages whose sender could not be resolved.
    pub skipped: usize,
}

/// Replay up to `limit` of today's channel messages into `bot`.
pub async fn backfill(bot: &StatusBot, now: DateTime<Utc>, limit: usize) -> BackfillReport {
    let since = start_of_day(now);
    info!(%since, limit, "Starting backfilling data");

    let history = match bot.transport().fetch_recent_history(since, limit).await {
        Ok(history) => history,
        Err(e) => {
            error!(error = %e, "Error backfilling data");
            return BackfillReport::default();
        }
    };

    let mut report = BackfillReport {
        fetched: history.len(),
        ..BackfillReport::default()
    };

    for message in history.iter().take(limit) {
        match bot.handle_message(&message.sender, &message.text).await {
            Ok(outcome) if outcome.is_recorded() => report.recorded += 1,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, sender = %message.sender, "Error handling user status update");
                report.skipped += 1;
            }
        }
    }

    info!(
        fetched = report.fetched,
        recorded = report.recorded,
        skipped = report.skipped,
        "Finished backfilling data"
    );
    report
}
