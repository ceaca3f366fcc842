//! Error types for the dispatch loop and its handlers.
//!
//! [`HandlerError`] is the split the dispatcher cares about: a `Domain`
//! failure is part of the service's own taxonomy and its text goes to the
//! hub verbatim, while an `Other` failure is anything else and only a fixed
//! sentinel text leaves the process. [`ServiceError`] covers the fatal
//! failures that terminate a run loop.

use thiserror::Error;

use selenol_protocol::{ConnectionError, SelenolError};

/// Failure returned by a request or message handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Failure from the service's own taxonomy; reported to the hub
    /// verbatim.
    #[error(transparent)]
    Domain(#[from] SelenolError),

    /// Any other failure; logged in full, redacted on the wire.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fatal failures that terminate a run loop.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The transport failed; the closed-connection signal lands here.
    #[error("connection failure: {0}")]
    Connection(#[from] ConnectionError),

    /// An inbound frame could not be turned into a message.
    #[error("unprocessable inbound message: {0}")]
    Message(#[source] SelenolError),

    /// A client-loop handler failed; the client loop has no exception
    /// frames to fall back to.
    #[error("handler failure: {0}")]
    Handler(#[source] HandlerError),
}

impl ServiceError {
    /// Returns true when the failure is the closed-connection signal.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Connection(error) if error.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_connection_is_recognised() {
        let error = ServiceError::Connection(ConnectionError::closed());
        assert!(error.is_closed());

        let error = ServiceError::Message(SelenolError::missing_field("request_id"));
        assert!(!error.is_closed());
    }

    #[test]
    fn domain_failures_keep_their_text() {
        let error = HandlerError::from(SelenolError::service("boom"));
        assert_eq!(error.to_string(), "boom");
    }
}
