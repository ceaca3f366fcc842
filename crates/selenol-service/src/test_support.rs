//! Shared test collaborators for the service crate.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use selenol_protocol::{Connection, ConnectionError};

/// Scripted in-memory connection.
///
/// Outbound messages are captured; inbound ones are served from a queue and
/// an empty queue reports the connection as closed, so a run loop naturally
/// terminates once the script is consumed.
#[derive(Debug, Default)]
pub(crate) struct MockConnection {
    inbound: Vec<Value>,
    sent: Rc<RefCell<Vec<Value>>>,
    closed: bool,
}

impl MockConnection {
    pub(crate) fn with_inbound(mut inbound: Vec<Value>) -> Self {
        // Served back-to-front; reverse so scripts read in delivery order.
        inbound.reverse();
        Self {
            inbound,
            ..Self::default()
        }
    }

    /// Handle onto the captured outbound frames, usable after the
    /// connection has been moved into a service.
    pub(crate) fn sent_handle(&self) -> Rc<RefCell<Vec<Value>>> {
        Rc::clone(&self.sent)
    }

    /// Snapshot of the captured outbound frames.
    pub(crate) fn sent(&self) -> Vec<Value> {
        self.sent.borrow().clone()
    }

    /// Marks the connection closed without a close frame.
    pub(crate) fn close_now(&mut self) {
        self.closed = true;
    }
}

impl Connection for MockConnection {
    fn send(&mut self, message: &Value) -> Result<(), ConnectionError> {
        if self.closed {
            return Err(ConnectionError::closed());
        }
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }

    fn recv(&mut self) -> Result<Value, ConnectionError> {
        if self.closed {
            return Err(ConnectionError::closed());
        }
        self.inbound.pop().ok_or_else(ConnectionError::closed)
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        self.closed = true;
        Ok(())
    }
}

/// Example request coming from the hub.
pub(crate) fn sample_payload() -> Value {
    json!({
        "request_id": 1,
        "content": {
            "session": {"keys": "values"},
            "content": {"keyc": "valuec"},
        },
    })
}
