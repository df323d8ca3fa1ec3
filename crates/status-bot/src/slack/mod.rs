//! Slack implementation of the chat transport: Web API calls over HTTPS and
//! live events over Socket Mode.

pub mod socket;
pub mod types;
pub mod web;

pub use socket::{decode_frame, SocketFrame, SocketModeListener};
pub use web::SlackClient;
