//! Wire-level types for Selenol services.
//!
//! A Selenol service attaches to a message hub over one persistent,
//! bidirectional connection and answers requests routed to it by reason
//! path. This crate holds the pieces every other layer shares: the
//! exception-safe payload accessor ([`SafeDict`]/[`SafeList`]), the typed
//! inbound [`Message`], the outbound [`Frame`] shapes, the domain error
//! taxonomy ([`SelenolError`]) and the [`Connection`] boundary trait the
//! transport implements.

mod access;
mod connection;
mod error;
mod frame;
mod message;
mod segment;

pub use access::{MissingKind, SafeDict, SafeList, SafeValue};
pub use connection::Connection;
pub use error::{ConnectionError, SelenolError};
pub use frame::Frame;
pub use message::Message;
pub use segment::{Segment, ValuePath};
