//! Error taxonomy for the Selenol protocol layer.
//!
//! [`SelenolError`] is the domain root: every failure a handler or extractor
//! raises on purpose belongs here, and the dispatcher reports these to the
//! hub verbatim. Transport failures live in [`ConnectionError`]; the
//! closed-connection signal is never translated into an outbound frame.

use serde_json::Value;
use thiserror::Error;

use crate::segment::{Segment, ValuePath};

/// Domain failures recognised by the dispatcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelenolError {
    /// Generic domain failure raised by handler logic.
    #[error("{message}")]
    Service { message: String },

    /// A required top-level message field is absent.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A payload lookup failed outside any argument context.
    #[error("no entry '{segment}' in payload")]
    MissingEntry { segment: Segment },

    /// A required content argument is absent from the caller's payload.
    #[error("missing content argument '{segment}'")]
    MissingArgument { segment: Segment },

    /// A required session argument is absent from the hub-managed payload.
    #[error("missing session argument '{segment}'")]
    MissingSessionArgument { segment: Segment },

    /// An argument was present but did not resolve to a usable entity.
    #[error("argument '{path}' does not resolve: {value}")]
    InvalidArgument { path: ValuePath, value: Value },

    /// A descent was requested with no segments to follow.
    #[error("argument path is empty")]
    EmptyPath,
}

impl SelenolError {
    /// Creates a generic domain failure with the given message.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Creates a missing-field error for a top-level message field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a generic missing-entry error.
    pub fn missing_entry(segment: impl Into<Segment>) -> Self {
        Self::MissingEntry {
            segment: segment.into(),
        }
    }

    /// Creates a missing content-argument error.
    pub fn missing_argument(segment: impl Into<Segment>) -> Self {
        Self::MissingArgument {
            segment: segment.into(),
        }
    }

    /// Creates a missing session-argument error.
    pub fn missing_session_argument(segment: impl Into<Segment>) -> Self {
        Self::MissingSessionArgument {
            segment: segment.into(),
        }
    }

    /// Creates an invalid-argument error carrying the path and the value
    /// that failed to resolve.
    pub fn invalid_argument(path: impl Into<ValuePath>, value: Value) -> Self {
        Self::InvalidArgument {
            path: path.into(),
            value,
        }
    }
}

/// Failures surfaced by the transport collaborator.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The connection is no longer usable. Always fatal for the instance.
    #[error("connection closed")]
    Closed {
        /// Close code reported by the peer, when the transport carries one.
        code: Option<u16>,
        /// Close reason reported by the peer.
        reason: Option<String>,
    },

    /// A frame could not be encoded or decoded as JSON.
    #[error("frame codec failure: {0}")]
    Codec(#[from] serde_json::Error),

    /// Transport failure outside the close handshake.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl ConnectionError {
    /// Creates a closed-connection signal with no close frame details.
    #[must_use]
    pub const fn closed() -> Self {
        Self::Closed {
            code: None,
            reason: None,
        }
    }

    /// Creates a transport failure with the given description.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns true for the closed-connection signal.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}
