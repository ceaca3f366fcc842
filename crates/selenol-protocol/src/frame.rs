//! Outbound frame construction.
//!
//! Every message the dispatcher emits shares the `{reason, request_id?,
//! content}` envelope; the builders here produce the well-defined shapes the
//! hub understands (result, exception, metadata, event, notification,
//! send). Conversion to a raw value is infallible, so the send path carries
//! no serialisation failure mode of its own.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Leading reason component shared by every request-scoped frame.
const REQUEST: &str = "request";

/// Outbound protocol envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Routing path of the outbound message.
    pub reason: Vec<String>,
    /// Correlation id, when the frame answers or references a request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
    /// Frame payload.
    pub content: Value,
}

impl Frame {
    /// Successful handler outcome for the given request.
    #[must_use]
    pub fn result(request_id: Value, content: Value) -> Self {
        Self {
            reason: request_reason("result"),
            request_id: Some(request_id),
            content,
        }
    }

    /// Domain failure report for the given request.
    #[must_use]
    pub fn exception(request_id: Value, message: impl Into<String>) -> Self {
        Self {
            reason: request_reason("exception"),
            request_id: Some(request_id),
            content: json!({ "message": message.into() }),
        }
    }

    /// Supplementary metadata attached to an in-flight request.
    #[must_use]
    pub fn metadata(request_id: Value, content: Value) -> Self {
        Self {
            reason: request_reason("metadata"),
            request_id: Some(request_id),
            content,
        }
    }

    /// Deferred event registration for the given request.
    #[must_use]
    pub fn event(request_id: Value, trigger: Value, reason: Value, content: Value) -> Self {
        Self {
            reason: request_reason("event"),
            request_id: Some(request_id),
            content: json!({
                "trigger": trigger,
                "message": { "reason": reason, "content": content },
            }),
        }
    }

    /// Broadcast notification on a topic; no correlation id until one is
    /// attached with [`Frame::with_request_id`].
    #[must_use]
    pub fn notification(topic: Value, content: Value) -> Self {
        Self {
            reason: request_reason("notification"),
            request_id: None,
            content: json!({ "topic": topic, "content": content }),
        }
    }

    /// Arbitrary hub-routed send; the fresh correlation id travels inside
    /// the payload.
    #[must_use]
    pub fn send(request_id: Value, reason: Value, content: Value) -> Self {
        Self {
            reason: request_reason("send"),
            request_id: None,
            content: json!({
                "request_id": request_id,
                "reason": reason,
                "content": content,
            }),
        }
    }

    /// Attaches a top-level correlation id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Value) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Converts the frame into its raw wire value.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert("reason".to_owned(), Value::from(self.reason));
        if let Some(request_id) = self.request_id {
            map.insert("request_id".to_owned(), request_id);
        }
        map.insert("content".to_owned(), self.content);
        Value::Object(map)
    }
}

impl From<Frame> for Value {
    fn from(frame: Frame) -> Self {
        frame.into_value()
    }
}

fn request_reason(kind: &str) -> Vec<String> {
    vec![REQUEST.to_owned(), kind.to_owned()]
}
