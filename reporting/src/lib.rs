//! Status Reporting Core
//!
//! Deterministic building blocks for the daily status bot:
//! - `ignore`: the ignore list of members excluded from reporting
//! - `interpreter`: extracting a reporting identity from a chat message
//! - `ledger`: the concurrent-safe set of members who reported this cycle
//! - `roster`: reconciling reporters against the channel roster
//! - `summary`: rendering the end-of-day summary fields
//! - `cycle`: daily trigger timing and the weekend policy
//!
//! Nothing in this crate performs I/O. The runtime in `status-bot` feeds chat
//! events in and posts the formatted summary out.
//!
//! # Flow
//!
//! ```text
//! message ─► extract_identity ─► IgnorePolicy::contains? ─► ReportLedger::report
//!                                                               │
//! trigger ─► CycleDecision ─► ReportLedger::snapshot_and_clear ◄┘
//!                                 │
//!             channel roster ─► not_reported ─► Summary ─► post
//! ```

pub mod cycle;
pub mod ignore;
pub mod interpreter;
pub mod ledger;
pub mod roster;
pub mod summary;

pub use cycle::{
    is_weekend, next_trigger_after, start_of_day, CycleDecision, ScheduleError, TriggerTime,
};
pub use ignore::IgnorePolicy;
pub use interpreter::extract_identity;
pub use ledger::ReportLedger;
pub use roster::not_reported;
pub use summary::{connect_values, Summary, SummaryField};
