//! Text wire format for the framing protocol.
//!
//! One frame on the wire is:
//!
//! ```text
//! Content-Length: <N>\r\n
//! \r\n
//! <exactly N bytes of UTF-8 JSON>
//! ```
//!
//! # Example
//!
//! ```
//! use astwire::protocol::{encode_frame, parse_content_length};
//!
//! let frame = encode_frame(br#"{"command":"x"}"#);
//! assert!(frame.starts_with(b"Content-Length: 15\r\n\r\n"));
//!
//! assert_eq!(parse_content_length(b"Content-Length: 42\r\n"), Some(42));
//! ```

/// Literal prefix of the header line.
pub const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length:";

/// Blank-line sentinel separating header from body.
pub const BLANK_LINE: &[u8] = b"\r\n";

/// Default maximum body size accepted from the peer (1 GB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1_073_741_824;

/// Build a complete outbound frame for the given body.
///
/// Produces exactly `Content-Length: <len>\r\n\r\n` followed by the
/// body bytes, with no trailing data.
pub fn encode_frame(body: &[u8]) -> Vec<u8> {
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    let mut buf = Vec::with_capacity(header.len() + body.len());
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(body);
    buf
}

/// Parse the content length from a header line.
///
/// The line must start with the literal `Content-Length:` prefix;
/// whitespace and the line terminator around the integer are ignored.
/// Returns `None` for any other line or an unparseable integer.
pub fn parse_content_length(line: &[u8]) -> Option<usize> {
    let rest = line.strip_prefix(CONTENT_LENGTH_PREFIX)?;
    let text = std::str::from_utf8(rest).ok()?;
    text.trim().parse().ok()
}

/// Whether the line is exactly the blank-line sentinel.
#[inline]
pub fn is_blank_line(line: &[u8]) -> bool {
    line == BLANK_LINE
}
