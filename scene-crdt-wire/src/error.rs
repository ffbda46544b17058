//! Error types for the wire codec.

use thiserror::Error;

/// Result type for codec operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while decoding or encoding frames.
///
/// Decode errors are fatal for the buffer they came from: the caller should
/// drop the frame batch rather than try to resynchronize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Fewer bytes remain than the header being read needs.
    #[error("truncated frame at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The declared frame length cannot hold the headers of its type.
    #[error("invalid frame length {length} at offset {offset}")]
    InvalidLength { offset: usize, length: usize },

    /// The frame exceeds the configured size limit.
    #[error("message too large at offset {offset}: {length} bytes (limit {limit})")]
    TooLarge {
        offset: usize,
        length: usize,
        limit: usize,
    },

    /// The type field holds a value outside the closed set.
    #[error("unknown message type {message_type} at offset {offset}")]
    UnknownMessageType { offset: usize, message_type: u32 },

    /// The payload length disagrees with the frame length.
    #[error("payload length {payload} does not fit frame of {frame} bytes at offset {offset}")]
    PayloadMismatch {
        offset: usize,
        frame: usize,
        payload: usize,
    },

    /// The destination slice is too small for the encoded message.
    #[error("buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    /// A length does not fit the 32-bit wire field.
    #[error("length {0} does not fit in a u32 field")]
    LengthOverflow(usize),
}
