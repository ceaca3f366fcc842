//! Outbound messaging context shared with handlers.
//!
//! [`HubLink`] owns the connection and the opaque store handle and exposes
//! the raw send surface a low-level client uses. [`ServiceContext`] layers
//! the service's reason prefix and the well-defined request-scoped frame
//! shapes on top; it is what request handlers receive, so business logic can
//! emit metadata, events and notifications mid-request without touching the
//! connection directly.

use serde_json::{Value, json};
use uuid::Uuid;

use selenol_protocol::{Connection, ConnectionError, Frame};

use crate::service::ReasonPrefix;

/// Raw link to the hub: connection plus the opaque store handle.
pub struct HubLink<C, S> {
    connection: C,
    store: S,
}

impl<C: Connection, S> HubLink<C, S> {
    /// Bundles a connection with the store handle it serves.
    pub const fn new(connection: C, store: S) -> Self {
        Self { connection, store }
    }

    /// Returns the store handle.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the store handle mutably.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Sends a bare `{reason, content}` frame.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure, [`ConnectionError::Closed`]
    /// included.
    pub fn send(&mut self, reason: Value, content: Value) -> Result<(), ConnectionError> {
        self.send_value(&json!({ "reason": reason, "content": content }))
    }

    /// Sends a notification on a topic.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn notify(&mut self, topic: Value, content: Value) -> Result<(), ConnectionError> {
        self.send_frame(Frame::notification(topic, content))
    }

    /// Sends an arbitrary value verbatim.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn send_value(&mut self, message: &Value) -> Result<(), ConnectionError> {
        self.connection.send(message)
    }

    /// Sends a typed outbound frame.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn send_frame(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        self.send_value(&frame.into_value())
    }

    /// Blocks until the next inbound message arrives.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn recv(&mut self) -> Result<Value, ConnectionError> {
        self.connection.recv()
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn close(&mut self) -> Result<(), ConnectionError> {
        self.connection.close()
    }
}

/// Request-scoped messaging surface handed to service handlers.
pub struct ServiceContext<C, S> {
    link: HubLink<C, S>,
    prefix: ReasonPrefix,
}

impl<C: Connection, S> ServiceContext<C, S> {
    pub(crate) const fn new(prefix: ReasonPrefix, connection: C, store: S) -> Self {
        Self {
            link: HubLink::new(connection, store),
            prefix,
        }
    }

    /// Returns the reason prefix this instance answers for.
    pub const fn prefix(&self) -> &ReasonPrefix {
        &self.prefix
    }

    /// Returns the store handle.
    pub const fn store(&self) -> &S {
        self.link.store()
    }

    /// Returns the store handle mutably.
    pub const fn store_mut(&mut self) -> &mut S {
        self.link.store_mut()
    }

    /// Announces the instance and its prefix to the hub.
    pub(crate) fn register(&mut self) -> Result<(), ConnectionError> {
        let components = self.prefix.components().to_vec();
        self.link
            .send(json!(["service", "register"]), json!({ "reason": components }))
    }

    /// Attaches metadata to an in-flight request.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn metadata(&mut self, request_id: Value, content: Value) -> Result<(), ConnectionError> {
        self.link.send_frame(Frame::metadata(request_id, content))
    }

    /// Registers a deferred event for a request.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn event(
        &mut self,
        request_id: Value,
        trigger: Value,
        reason: Value,
        content: Value,
    ) -> Result<(), ConnectionError> {
        self.link
            .send_frame(Frame::event(request_id, trigger, reason, content))
    }

    /// Broadcasts a notification on a topic under a fresh request id.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn notify(&mut self, topic: Value, content: Value) -> Result<(), ConnectionError> {
        self.link
            .send_frame(Frame::notification(topic, content).with_request_id(fresh_request_id()))
    }

    /// Routes an arbitrary payload through the hub under a fresh request id.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn send(&mut self, reason: Value, content: Value) -> Result<(), ConnectionError> {
        self.link
            .send_frame(Frame::send(fresh_request_id(), reason, content))
    }

    pub(crate) fn reply_result(
        &mut self,
        request_id: Value,
        content: Value,
    ) -> Result<(), ConnectionError> {
        self.link.send_frame(Frame::result(request_id, content))
    }

    pub(crate) fn reply_exception(
        &mut self,
        request_id: Value,
        message: &str,
    ) -> Result<(), ConnectionError> {
        self.link.send_frame(Frame::exception(request_id, message))
    }

    pub(crate) fn recv(&mut self) -> Result<Value, ConnectionError> {
        self.link.recv()
    }
}

/// Fresh correlation id for hub-initiated frames.
fn fresh_request_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_support::MockConnection;

    use super::*;

    fn context(connection: MockConnection) -> ServiceContext<MockConnection, ()> {
        ServiceContext::new(ReasonPrefix::new(["reason", "a"]), connection, ())
    }

    #[test]
    fn register_announces_the_prefix() {
        let mut context = context(MockConnection::default());
        context.register().expect("send register");

        let sent = context.link.connection.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["reason"], json!(["service", "register"]));
        assert_eq!(sent[0]["content"], json!({"reason": ["reason", "a"]}));
    }

    #[test]
    fn metadata_carries_the_request_id() {
        let mut context = context(MockConnection::default());
        context
            .metadata(json!(7), json!({"keym": "valuem"}))
            .expect("send metadata");

        let sent = context.link.connection.sent();
        assert_eq!(sent[0]["reason"], json!(["request", "metadata"]));
        assert_eq!(sent[0]["request_id"], json!(7));
        assert_eq!(sent[0]["content"], json!({"keym": "valuem"}));
    }

    #[test]
    fn notify_generates_a_fresh_request_id() {
        let mut context = context(MockConnection::default());
        context
            .notify(json!(["test", "topic"]), json!({"keyc": "valuec"}))
            .expect("send notification");

        let sent = context.link.connection.sent();
        assert_eq!(sent[0]["reason"], json!(["request", "notification"]));
        assert!(sent[0]["request_id"].is_string());
        assert_eq!(sent[0]["content"]["topic"], json!(["test", "topic"]));
        assert_eq!(sent[0]["content"]["content"], json!({"keyc": "valuec"}));
    }

    #[test]
    fn send_keeps_the_generated_id_in_the_payload() {
        let mut context = context(MockConnection::default());
        context
            .send(json!(["test", "reason"]), json!({"keyc": "valuec"}))
            .expect("send payload");

        let sent = context.link.connection.sent();
        assert_eq!(sent[0]["reason"], json!(["request", "send"]));
        assert!(sent[0]["content"]["request_id"].is_string());
        assert_eq!(sent[0]["content"]["reason"], json!(["test", "reason"]));
        assert_eq!(sent[0]["content"]["content"], json!({"keyc": "valuec"}));
    }

    #[test]
    fn sends_fail_once_the_connection_is_closed() {
        let mut connection = MockConnection::default();
        connection.close_now();
        let mut context = context(connection);

        let error = context
            .metadata(json!(7), json!(null))
            .expect_err("connection is closed");
        assert!(error.is_closed());
    }
}
