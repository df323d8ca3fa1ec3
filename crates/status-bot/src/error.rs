//! Transport error taxonomy.
//!
//! Every failure talking to the chat platform is a [`TransportError`]. None of
//! them is fatal: the caller logs it and skips the item it was working on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a usable HTTP response.
    #[error("HTTP request to {method} failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The platform answered with `ok: false`.
    #[error("{method} returned error: {error}")]
    Api { method: &'static str, error: String },

    /// The response body did not have the expected shape.
    #[error("could not decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    /// The Socket Mode WebSocket failed.
    #[error("socket mode connection failed: {0}")]
    Socket(String),

    /// The consumer side of the event channel went away.
    #[error("event channel closed")]
    Closed,
}

impl TransportError {
    pub fn http(method: &'static str, source: reqwest::Error) -> Self {
        Self::Http { method, source }
    }

    pub fn api(method: &'static str, error: impl Into<String>) -> Self {
        Self::Api {
            method,
            error: error.into(),
        }
    }

    pub fn decode(what: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            what,
            reason: reason.to_string(),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
