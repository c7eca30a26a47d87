//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for the connection-scoped receive buffer and
//! implements the framing state machine over it:
//! - `AwaitingHeaderLine`: scanning lines for a `Content-Length:` header
//! - `AwaitingBlankLine`: length known, waiting for the `\r\n` sentinel
//! - `AwaitingBody`: header cycle complete, need N more body bytes
//!
//! # Example
//!
//! ```
//! use astwire::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new();
//!
//! // Data arrives in arbitrary chunks from the socket.
//! let bodies = buffer.push(b"Content-Length: 2\r\n\r\nok").unwrap();
//! assert_eq!(bodies.len(), 1);
//! assert_eq!(&bodies[0][..], b"ok");
//! ```

use bytes::{Bytes, BytesMut};

use super::frame::{is_blank_line, parse_content_length, CONTENT_LENGTH_PREFIX, DEFAULT_MAX_BODY_SIZE};
use crate::error::{AstwireError, Result};

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Scanning header lines; no content length pending yet.
    AwaitingHeaderLine,
    /// Content length pending, waiting for the blank-line sentinel.
    AwaitingBlankLine { len: usize },
    /// Header cycle complete, waiting for `len` body bytes.
    AwaitingBody { len: usize },
}

/// Buffer for accumulating incoming bytes and extracting frame bodies.
///
/// Exclusively owned by the bridge loop for the lifetime of one
/// connection; partial lines and bodies stay buffered between pushes.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed body size.
    max_body_size: usize,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 64KB, max body: 1GB.
    pub fn new() -> Self {
        Self::with_max_body(DEFAULT_MAX_BODY_SIZE)
    }

    /// Create a new frame buffer with a custom max body size.
    pub fn with_max_body(max_body_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::AwaitingHeaderLine,
            max_body_size,
        }
    }

    /// Push data into the buffer and extract all complete frame bodies.
    ///
    /// This is the main API for processing incoming data from the
    /// socket. Returns the bodies of all frames completed by this
    /// chunk; fragmented data is buffered for the next push.
    ///
    /// # Errors
    ///
    /// Returns a protocol error for an unparseable `Content-Length`
    /// integer or a body larger than the configured maximum. Framing
    /// errors are connection-fatal: the caller ends the loop rather
    /// than reporting them to the peer.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>> {
        self.buffer.extend_from_slice(data);

        let mut bodies = Vec::new();
        while let Some(body) = self.try_extract_one()? {
            bodies.push(body);
        }
        Ok(bodies)
    }

    /// Try to extract a single frame body from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(body))` if a complete frame was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` on a framing violation
    fn try_extract_one(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                State::AwaitingHeaderLine => {
                    let Some(line) = self.take_line() else {
                        return Ok(None);
                    };
                    if let Some(len) = self.parse_header_line(&line)? {
                        self.state = State::AwaitingBlankLine { len };
                    }
                    // Anything else before a header is ignored.
                }

                State::AwaitingBlankLine { len } => {
                    let Some(line) = self.take_line() else {
                        return Ok(None);
                    };
                    if let Some(len) = self.parse_header_line(&line)? {
                        // A re-stated header updates the pending length.
                        self.state = State::AwaitingBlankLine { len };
                    } else if is_blank_line(&line) {
                        self.state = State::AwaitingBody { len };
                    }
                    // Other lines between header and blank line are
                    // ignored; the pending length survives them.
                }

                State::AwaitingBody { len } => {
                    if self.buffer.len() < len {
                        return Ok(None);
                    }
                    let body = self.buffer.split_to(len).freeze();
                    self.state = State::AwaitingHeaderLine;
                    return Ok(Some(body));
                }
            }
        }
    }

    /// Consume one line (terminator included) from the buffer, if a
    /// complete one is available.
    fn take_line(&mut self) -> Option<Bytes> {
        let end = self.buffer.iter().position(|&b| b == b'\n')? + 1;
        Some(self.buffer.split_to(end).freeze())
    }

    /// Interpret a line as a `Content-Length` header.
    ///
    /// Returns `Ok(Some(len))` for a valid header, `Ok(None)` for any
    /// unrelated line, and an error for a header whose integer cannot
    /// be parsed or exceeds the body cap.
    fn parse_header_line(&self, line: &[u8]) -> Result<Option<usize>> {
        if !line.starts_with(CONTENT_LENGTH_PREFIX) {
            return Ok(None);
        }
        let len = parse_content_length(line).ok_or_else(|| {
            AstwireError::Protocol(format!(
                "Malformed Content-Length header: {:?}",
                String::from_utf8_lossy(line)
            ))
        })?;
        if len > self.max_body_size {
            return Err(AstwireError::Protocol(format!(
                "Body size {} exceeds maximum {}",
                len, self.max_body_size
            )));
        }
        Ok(Some(len))
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset the state machine.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::AwaitingHeaderLine;
    }

    /// Get the current state for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::AwaitingHeaderLine => "AwaitingHeaderLine",
            State::AwaitingBlankLine { .. } => "AwaitingBlankLine",
            State::AwaitingBody { .. } => "AwaitingBody",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
