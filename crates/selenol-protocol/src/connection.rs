//! Transport boundary contract.

use serde_json::Value;

use crate::error::ConnectionError;

/// Blocking, message-oriented transport to the hub.
///
/// Implementations carry whole JSON values; framing is theirs to handle.
/// Once the peer is gone, every operation fails with
/// [`ConnectionError::Closed`], the signal the run loop treats as fatal.
pub trait Connection {
    /// Sends one outbound message.
    ///
    /// # Errors
    ///
    /// Fails with [`ConnectionError::Closed`] on a dead connection, or
    /// another [`ConnectionError`] on transport trouble.
    fn send(&mut self, message: &Value) -> Result<(), ConnectionError>;

    /// Blocks until the next inbound message arrives.
    ///
    /// # Errors
    ///
    /// Fails with [`ConnectionError::Closed`] on a dead connection, or
    /// another [`ConnectionError`] on transport trouble.
    fn recv(&mut self) -> Result<Value, ConnectionError>;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Fails with a [`ConnectionError`] when the close handshake cannot be
    /// delivered.
    fn close(&mut self) -> Result<(), ConnectionError>;
}
