//! Daily summary trigger.
//!
//! A single tokio task sleeps until the next trigger time (UTC), closes the
//! reporting cycle, and repeats until cancelled. Missed triggers (process down
//! at trigger time) are not caught up.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reporting::{next_trigger_after, ScheduleError, TriggerTime};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::bot::{CycleOutcome, StatusBot};

/// Source of wall-clock time for the scheduler.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct DailyScheduler {
    bot: Arc<StatusBot>,
    trigger: TriggerTime,
    clock: Arc<dyn Clock>,
    last_fired: Option<NaiveDate>,
}

impl DailyScheduler {
    /// Register the daily trigger at `time` (`HH:MM`, UTC).
    pub fn register(bot: Arc<StatusBot>, time: &str) -> Result<Self, ScheduleError> {
        let trigger: TriggerTime = time.parse()?;
        Ok(Self {
            bot,
            trigger,
            clock: Arc::new(SystemClock),
            last_fired: None,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(at = %self.trigger, "Daily summary scheduled (UTC)");
        loop {
            let now = self.clock.now();
            let next = next_trigger_after(now, self.trigger);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutting down summary scheduler");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let _ = self.fire(self.clock.now()).await;
        }
    }

    /// Close the cycle for `now`'s date, at most once per date.
    pub async fn fire(&mut self, now: DateTime<Utc>) -> Option<CycleOutcome> {
        let date = now.date_naive();
        if self.last_fired == Some(date) {
            warn!(%date, "Summary already handled for this date");
            return None;
        }
        self.last_fired = Some(date);

        match self.bot.close_cycle(now).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(error = %e, "Error sending summary message");
                None
            }
        }
    }
}
