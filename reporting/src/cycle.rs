//! Daily reporting cycle: when the summary fires and whether it is posted.
//!
//! All times are UTC. A cycle is one calendar day; the summary trigger fires
//! once per day at a fixed time of day, and weekend cycles are closed without
//! posting anything.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use thiserror::Error;

/// Errors raised while registering the daily trigger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid trigger time {0:?}: expected HH:MM (UTC)")]
    InvalidTime(String),
}

/// Time of day (UTC) at which the daily summary fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerTime(NaiveTime);

impl TriggerTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ScheduleError::InvalidTime(format!("{hour:02}:{minute:02}")))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl Default for TriggerTime {
    /// 23:55 UTC, shortly before the cycle's calendar day ends.
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(23, 55, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl FromStr for TriggerTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| ScheduleError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

/// What a trigger firing at a given instant should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDecision {
    /// Working day: build and post the summary.
    Emit,
    /// Saturday or Sunday: close the cycle without posting.
    SkipWeekend,
}

impl CycleDecision {
    pub fn at(now: DateTime<Utc>) -> Self {
        if is_weekend(now) {
            Self::SkipWeekend
        } else {
            Self::Emit
        }
    }

    pub fn should_post(self) -> bool {
        self == Self::Emit
    }
}

pub fn is_weekend(at: DateTime<Utc>) -> bool {
    matches!(at.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// The first instant strictly after `now` at which `trigger` fires.
pub fn next_trigger_after(now: DateTime<Utc>, trigger: TriggerTime) -> DateTime<Utc> {
    let today = fire_on(now.date_naive(), trigger);
    if today > now {
        return today;
    }
    match now.date_naive().checked_add_days(Days::new(1)) {
        Some(tomorrow) => fire_on(tomorrow, trigger),
        None => today,
    }
}

fn fire_on(date: NaiveDate, trigger: TriggerTime) -> DateTime<Utc> {
    date.and_time(trigger.time()).and_utc()
}
