//! Values that travel through an SSE stream.
//!
//! [`Message`] is what the server side queues for the writer task,
//! [`Event`] is what the client side hands to its consumer, and
//! [`SseLine`] is the classification of a single received line.

use bytes::Bytes;

/// One outbound frame waiting in a connection's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Value of the `event:` field; `None` omits the field.
    pub event_type: Option<String>,
    /// Value of the `data:` field.
    pub payload: Bytes,
}

impl Message {
    /// Create an untyped message.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            event_type: None,
            payload: payload.into(),
        }
    }

    /// Create a message that triggers `event_type` on the peer.
    ///
    /// An empty type is normalized to `None` so the `event:` field is omitted.
    pub fn with_event(event_type: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        let event_type = event_type.into();
        Self {
            event_type: (!event_type.is_empty()).then_some(event_type),
            payload: payload.into(),
        }
    }
}

/// A decoded event delivered to a client-side consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// URI of the stream the event was read from
    pub uri: String,
    /// Value of the preceding `event:` field, if any
    pub event_type: Option<String>,
    /// Trimmed value of the `data:` field
    pub data: Bytes,
}

impl Event {
    /// The payload as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Decode the payload as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.data)
    }
}

/// Classification of one line of an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// `event: <type>`
    Event(String),
    /// `data: <payload>`
    Data(Bytes),
    /// Anything else: blank lines, comments, lines without `": "`,
    /// and unknown fields such as `id:` or `retry:`.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_with_empty_event_omits_type() {
        let msg = Message::with_event("", "x");
        assert_eq!(msg.event_type, None);
        assert_eq!(msg, Message::new("x"));
    }

    #[test]
    fn test_message_with_event() {
        let msg = Message::with_event("time", "12:00");
        assert_eq!(msg.event_type.as_deref(), Some("time"));
        assert_eq!(msg.payload, Bytes::from_static(b"12:00"));
    }

    #[test]
    fn test_event_json() {
        let event = Event {
            uri: "http://localhost/events".to_string(),
            event_type: None,
            data: Bytes::from_static(br#"{"n":3}"#),
        };
        let value: serde_json::Value = event.json().unwrap();
        assert_eq!(value["n"], 3);
        assert_eq!(event.text(), r#"{"n":3}"#);
    }
}
