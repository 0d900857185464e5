//! Incremental decoding of an event stream.
//!
//! The decoder is line-oriented and lenient:
//! - lines shorter than 2 bytes are skipped
//! - a line is split on the first `": "` into field name and value;
//!   lines without it (including `:comment` lines) are ignored
//! - `event` sets the pending type, `data` emits one event immediately
//!   and consumes it, a blank line (end of frame) drops it
//! - every other field is ignored
//!
//! Multiple `data:` lines are not coalesced: each one is its own event.

use bytes::{Buf, Bytes, BytesMut};

use crate::sse::constants::{FIELD_DATA, FIELD_DELIMITER, FIELD_EVENT};
use crate::sse::events::{Event, SseLine};

/// Classify a single line. A trailing `\n` or `\r\n` may be present.
pub fn parse_sse_line(line: &[u8]) -> SseLine {
    if line.len() < 2 {
        return SseLine::Ignored;
    }

    let Some(pos) = find_delimiter(line) else {
        return SseLine::Ignored;
    };

    let name = &line[..pos];
    let value = trim_whitespace(&line[pos + FIELD_DELIMITER.len()..]);

    if name == FIELD_EVENT.as_bytes() {
        SseLine::Event(String::from_utf8_lossy(value).into_owned())
    } else if name == FIELD_DATA.as_bytes() {
        SseLine::Data(Bytes::copy_from_slice(value))
    } else {
        SseLine::Ignored
    }
}

fn trim_whitespace(mut value: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = value {
        if !first.is_ascii_whitespace() {
            break;
        }
        value = rest;
    }
    while let [rest @ .., last] = value {
        if !last.is_ascii_whitespace() {
            break;
        }
        value = rest;
    }
    value
}

fn find_delimiter(line: &[u8]) -> Option<usize> {
    line.windows(FIELD_DELIMITER.len())
        .position(|window| window == FIELD_DELIMITER)
}

/// Whether `line` carries nothing but its terminator.
fn is_blank(line: &[u8]) -> bool {
    matches!(line, b"\n" | b"\r\n" | b"\r" | b"")
}

/// Stateful decoder for one stream.
///
/// Feed raw body chunks with [`SseParser::feed`]; call [`SseParser::finish`]
/// at end-of-stream to process a final line that had no terminating `\n`.
#[derive(Debug)]
pub struct SseParser {
    uri: String,
    /// Type set by the last `event:` line, consumed by the next `data:` line
    /// or dropped at the blank line that ends the frame
    pending_type: Option<String>,
    /// Bytes received after the last `\n`
    buffer: BytesMut,
    /// Prefix of `buffer` already known to hold no `\n`
    scanned: usize,
}

impl SseParser {
    /// Create a decoder whose events are tagged with `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            pending_type: None,
            buffer: BytesMut::new(),
            scanned: 0,
        }
    }

    /// Feed one complete line, returning an event if it was a `data:` line.
    pub fn feed_line(&mut self, line: &[u8]) -> Option<Event> {
        if is_blank(line) {
            self.pending_type = None;
            return None;
        }

        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.pending_type = (!event_type.is_empty()).then_some(event_type);
                None
            }
            SseLine::Data(data) => Some(Event {
                uri: self.uri.clone(),
                event_type: self.pending_type.take(),
                data,
            }),
            SseLine::Ignored => None,
        }
    }

    /// Feed a chunk of body bytes, returning every event completed by it.
    ///
    /// Bytes of a partial line are scanned once, however many chunks it
    /// arrives in.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Event> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n')
            else {
                break;
            };
            let line = self.buffer.split_to(self.scanned + offset + 1);
            self.scanned = 0;
            if let Some(event) = self.feed_line(&line) {
                events.push(event);
            }
        }
        self.scanned = self.buffer.len();
        events
    }

    /// Process whatever is left after the last `\n`.
    pub fn finish(&mut self) -> Option<Event> {
        self.scanned = 0;
        if !self.buffer.has_remaining() {
            return None;
        }
        let line = self.buffer.split();
        self.feed_line(&line)
    }
}
