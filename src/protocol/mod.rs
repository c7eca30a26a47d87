//! Framing protocol engine.
//!
//! Implements the `Content-Length:`-delimited message framing used on
//! the wire in both directions:
//!
//! - [`FrameBuffer`] - state machine extracting complete bodies from a
//!   byte stream with partial reads
//! - [`encode_frame`] - builds the outbound header + body byte sequence

mod frame;
mod frame_buffer;

pub use frame::{
    encode_frame, is_blank_line, parse_content_length, BLANK_LINE, CONTENT_LENGTH_PREFIX,
    DEFAULT_MAX_BODY_SIZE,
};
pub use frame_buffer::FrameBuffer;
