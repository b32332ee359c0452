//! Incremental server-sent-event frame parsing.
//!
//! The parser is byte-buffered and stateful: a frame boundary may fall
//! anywhere inside a network chunk, including mid-field, mid-payload, or in
//! the middle of a UTF-8 codepoint. Bytes are buffered until a complete frame
//! (terminated by a blank line) is available, then the frame's `data` payload
//! is decoded as text.

use crate::error::{ChatError, Result};

/// An incremental SSE frame parser.
///
/// Feed raw network chunks with [`push`](SseParser::push), then drain
/// complete `data` payloads with [`next_event`](SseParser::next_event).
#[derive(Debug, Default)]
pub struct SseParser {
    buf: Vec<u8>,
}

impl SseParser {
    /// Create an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a raw network chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the `data` payload of the next complete frame, if any.
    ///
    /// Frames without a `data` field (comments, `event:`/`id:` only) are
    /// skipped. Returns `Ok(None)` when no complete frame is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::StreamParse`] if a complete frame is not valid
    /// UTF-8. The frame is consumed from the buffer either way.
    pub fn next_event(&mut self) -> Result<Option<String>> {
        while let Some((frame_len, delimiter_len)) = find_frame_boundary(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..frame_len + delimiter_len).collect();
            if let Some(data) = parse_frame(&frame[..frame_len])? {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}

/// Locate the earliest blank-line frame delimiter (`\n\n` or `\r\n\r\n`).
///
/// Returns the frame length and the delimiter length.
fn find_frame_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = find_subslice(buf, b"\r\n\r\n").map(|at| (at, 4));
    let lf = find_subslice(buf, b"\n\n").map(|at| (at, 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (found, None) | (None, found) => found,
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Parse one complete frame into its joined `data` payload.
fn parse_frame(frame: &[u8]) -> Result<Option<String>> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| ChatError::StreamParse(format!("frame is not valid UTF-8: {e}")))?;

    let mut data_lines: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.starts_with(':') {
            // Comment line.
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            data_lines.push(value);
        }
    }

    if data_lines.is_empty() { Ok(None) } else { Ok(Some(data_lines.join("\n"))) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(parser: &mut SseParser) -> Vec<String> {
        let mut events = Vec::new();
        while let Some(event) = parser.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn parses_a_complete_frame() {
        let mut parser = SseParser::new();
        parser.push(b"data: hello\n\n");
        assert_eq!(drain(&mut parser), vec!["hello"]);
    }

    #[test]
    fn buffers_until_the_frame_is_complete() {
        let mut parser = SseParser::new();
        parser.push(b"data: hel");
        assert_eq!(parser.next_event().unwrap(), None);
        parser.push(b"lo\n");
        assert_eq!(parser.next_event().unwrap(), None);
        parser.push(b"\n");
        assert_eq!(drain(&mut parser), vec!["hello"]);
    }

    #[test]
    fn tolerates_a_utf8_codepoint_split_across_chunks() {
        let bytes = "data: caf\u{e9}\n\n".as_bytes();
        // Split inside the two-byte encoding of 'é'.
        let split = bytes.len() - 3;
        let mut parser = SseParser::new();
        parser.push(&bytes[..split]);
        assert_eq!(parser.next_event().unwrap(), None);
        parser.push(&bytes[split..]);
        assert_eq!(drain(&mut parser), vec!["caf\u{e9}"]);
    }

    #[test]
    fn handles_crlf_delimiters() {
        let mut parser = SseParser::new();
        parser.push(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(drain(&mut parser), vec!["one", "two"]);
    }

    #[test]
    fn joins_multiple_data_lines_with_newline() {
        let mut parser = SseParser::new();
        parser.push(b"data: first\ndata: second\n\n");
        assert_eq!(drain(&mut parser), vec!["first\nsecond"]);
    }

    #[test]
    fn skips_comments_and_non_data_fields() {
        let mut parser = SseParser::new();
        parser.push(b": keep-alive\n\nevent: message\nid: 7\n\ndata: payload\n\n");
        assert_eq!(drain(&mut parser), vec!["payload"]);
    }

    #[test]
    fn data_without_leading_space_is_accepted() {
        let mut parser = SseParser::new();
        parser.push(b"data:tight\n\n");
        assert_eq!(drain(&mut parser), vec!["tight"]);
    }

    #[test]
    fn invalid_utf8_frame_is_a_parse_error() {
        let mut parser = SseParser::new();
        parser.push(b"data: \xff\xfe\n\n");
        assert!(matches!(parser.next_event(), Err(ChatError::StreamParse(_))));
    }

    #[test]
    fn multiple_frames_in_one_chunk_come_out_in_order() {
        let mut parser = SseParser::new();
        parser.push(b"data: a\n\ndata: b\n\ndata: c\n\n");
        assert_eq!(drain(&mut parser), vec!["a", "b", "c"]);
    }
}
