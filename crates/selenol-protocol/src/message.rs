//! Typed view of one inbound hub frame.
//!
//! [`Message::parse`] is a pure transform from the raw payload to typed
//! fields. The correlation id is the only mandatory piece; the routing path
//! and both payload sections are tolerated absent. The payload sections come
//! back as [`SafeDict`] views whose error kinds match their origin, so a
//! missing content path and a missing session path surface as distinct
//! failures without any call-site special-casing.

use serde_json::{Map, Value};

use crate::access::{MissingKind, SafeDict};
use crate::error::SelenolError;

/// Parsed inbound frame from the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    request_id: Value,
    reason: Option<Vec<String>>,
    content: Map<String, Value>,
    session: Map<String, Value>,
}

impl Message {
    /// Parses a raw inbound payload.
    ///
    /// The `content.content` and `content.session` subsections default to
    /// empty mappings when absent; a missing or mistyped routing path parses
    /// as `None` and never matches any prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SelenolError::MissingField`] naming `request_id` when the
    /// correlation id is absent, regardless of any other fields present.
    pub fn parse(raw: &Value) -> Result<Self, SelenolError> {
        let request_id = raw
            .get("request_id")
            .cloned()
            .ok_or_else(|| SelenolError::missing_field("request_id"))?;

        let sections = raw.get("content");
        Ok(Self {
            request_id,
            reason: parse_reason(raw.get("reason")),
            content: section(sections, "content"),
            session: section(sections, "session"),
        })
    }

    /// Returns the correlation id of the originating request.
    #[must_use]
    pub const fn request_id(&self) -> &Value {
        &self.request_id
    }

    /// Returns the routing path, when the frame carried one.
    #[must_use]
    pub fn reason(&self) -> Option<&[String]> {
        self.reason.as_deref()
    }

    /// Returns the routing components after the first `prefix_len` ones.
    #[must_use]
    pub fn reason_suffix(&self, prefix_len: usize) -> &[String] {
        self.reason
            .as_deref()
            .and_then(|reason| reason.get(prefix_len..))
            .unwrap_or_default()
    }

    /// Returns the caller-controlled payload section.
    #[must_use]
    pub fn content(&self) -> SafeDict<'_> {
        SafeDict::new(&self.content, MissingKind::ContentArgument)
    }

    /// Returns the hub-managed payload section.
    #[must_use]
    pub fn session(&self) -> SafeDict<'_> {
        SafeDict::new(&self.session, MissingKind::SessionArgument)
    }
}

fn parse_reason(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|component| component.as_str().map(str::to_owned))
        .collect()
}

fn section(sections: Option<&Value>, name: &str) -> Map<String, Value> {
    sections
        .and_then(|value| value.get(name))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_payload() -> Value {
        json!({
            "request_id": 1,
            "reason": ["selenol", "request"],
            "content": {
                "session": {"keys": "values"},
                "content": {"keyc": "valuec"},
            },
        })
    }

    #[test]
    fn parses_all_fields() {
        let message = Message::parse(&sample_payload()).expect("parse");
        assert_eq!(message.request_id(), &json!(1));
        assert_eq!(
            message.reason(),
            Some(&["selenol".to_owned(), "request".to_owned()][..])
        );
        assert_eq!(
            message.content().get("keyc").expect("content key").to_value(),
            json!("valuec")
        );
        assert_eq!(
            message.session().get("keys").expect("session key").to_value(),
            json!("values")
        );
    }

    #[test]
    fn tolerates_missing_session_section() {
        let mut payload = sample_payload();
        payload["content"]
            .as_object_mut()
            .expect("content mapping")
            .remove("session");

        let message = Message::parse(&payload).expect("parse");
        assert!(message.session().is_empty());
    }

    #[test]
    fn tolerates_missing_content_section() {
        let mut payload = sample_payload();
        payload["content"]
            .as_object_mut()
            .expect("content mapping")
            .remove("content");

        let message = Message::parse(&payload).expect("parse");
        assert!(message.content().is_empty());
    }

    #[test]
    fn missing_request_id_is_rejected_by_name() {
        let mut payload = sample_payload();
        payload
            .as_object_mut()
            .expect("payload mapping")
            .remove("request_id");

        let error = Message::parse(&payload).expect_err("request id is mandatory");
        assert_eq!(error, SelenolError::missing_field("request_id"));
    }

    #[test]
    fn absent_or_mistyped_reason_parses_as_none() {
        let mut payload = sample_payload();
        payload
            .as_object_mut()
            .expect("payload mapping")
            .remove("reason");
        assert_eq!(Message::parse(&payload).expect("parse").reason(), None);

        payload["reason"] = json!("not-a-list");
        assert_eq!(Message::parse(&payload).expect("parse").reason(), None);

        payload["reason"] = json!(["ok", 5]);
        assert_eq!(Message::parse(&payload).expect("parse").reason(), None);
    }

    #[test]
    fn reason_suffix_strips_the_matched_prefix() {
        let message = Message::parse(&sample_payload()).expect("parse");
        assert_eq!(message.reason_suffix(1), &["request".to_owned()][..]);
        assert!(message.reason_suffix(2).is_empty());
        assert!(message.reason_suffix(10).is_empty());
    }

    #[test]
    fn section_error_kinds_match_their_origin() {
        let message = Message::parse(&sample_payload()).expect("parse");
        assert_eq!(
            message.content().get("no").expect_err("absent"),
            SelenolError::missing_argument("no")
        );
        assert_eq!(
            message.session().get("no").expect_err("absent"),
            SelenolError::missing_session_argument("no")
        );
    }
}
