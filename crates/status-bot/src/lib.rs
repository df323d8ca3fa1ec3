//! Daily status bot runtime.
//!
//! Wires the deterministic `reporting` core to Slack:
//! - `config`: environment configuration
//! - `transport`: the `ChatTransport` seam and message types
//! - `slack`: Web API client and Socket Mode listener
//! - `bot`: the `StatusBot` context (ledger + ignore policy + transport)
//! - `backfill`: startup replay of today's channel history
//! - `event_loop`: live message consumption
//! - `scheduler`: the daily summary trigger
//! - `shutdown`: cancellation and task joining

pub mod backfill;
pub mod bot;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod logging;
pub mod scheduler;
pub mod shutdown;
pub mod slack;
pub mod transport;

pub use bot::{CycleOutcome, MessageOutcome, StatusBot};
pub use config::BotConfig;
pub use error::{TransportError, TransportResult};
pub use transport::{ChatTransport, HistoryMessage, MessageEvent};
