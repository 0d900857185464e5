//! Bit-exact SSE frame encoding.
//!
//! ```text
//! retry: <ms>\n\n        (once, at connection start)
//! event: <type>\n        (only when the message has a type)
//! data: <payload>\n
//! \n
//! ```

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use super::constants::{FIELD_DATA, FIELD_DELIMITER, FIELD_EVENT, FIELD_RETRY};
use super::events::Message;

/// Append the frame for `message` to `buf`.
///
/// The payload is written verbatim; embedded newlines are not split into
/// multiple `data:` fields.
pub fn encode_message(message: &Message, buf: &mut BytesMut) {
    let type_len = message
        .event_type
        .as_ref()
        .map(|t| FIELD_EVENT.len() + FIELD_DELIMITER.len() + t.len() + 1)
        .unwrap_or(0);
    buf.reserve(type_len + FIELD_DATA.len() + FIELD_DELIMITER.len() + message.payload.len() + 2);

    if let Some(event_type) = &message.event_type {
        put_field(buf, FIELD_EVENT, event_type.as_bytes());
    }
    put_field(buf, FIELD_DATA, &message.payload);
    buf.put_u8(b'\n');
}

/// Encode `message` into a standalone buffer.
pub fn message_frame(message: &Message) -> Bytes {
    let mut buf = BytesMut::new();
    encode_message(message, &mut buf);
    buf.freeze()
}

/// Encode the reconnection-delay frame, or `None` when `retry` rounds down
/// to zero milliseconds.
pub fn retry_frame(retry: Duration) -> Option<Bytes> {
    let millis = retry.as_millis();
    if millis == 0 {
        return None;
    }

    let mut buf = BytesMut::new();
    put_field(&mut buf, FIELD_RETRY, millis.to_string().as_bytes());
    buf.put_u8(b'\n');
    Some(buf.freeze())
}

fn put_field(buf: &mut BytesMut, name: &str, value: &[u8]) {
    buf.put_slice(name.as_bytes());
    buf.put_slice(FIELD_DELIMITER);
    buf.put_slice(value);
    buf.put_u8(b'\n');
}
