//! Frame sizes.

use scene_crdt_types::{CrdtMessage, MessageType};

/// Size of the generic `[length][type]` header.
pub const MESSAGE_HEADER_LEN: usize = 8;

/// Largest frame the decoder accepts by default (16 MB).
pub const MAX_MESSAGE_LENGTH: usize = 16 * 1024 * 1024;

const FIELD_LEN: usize = 4;

/// Returns the size of the type-specific header that follows the generic one.
#[must_use]
pub const fn body_header_len(message_type: MessageType) -> usize {
    match message_type {
        MessageType::PutComponent | MessageType::AppendComponent => 4 * FIELD_LEN,
        MessageType::DeleteComponent => 3 * FIELD_LEN,
        MessageType::DeleteEntity => FIELD_LEN,
        MessageType::PutComponentNetwork => 5 * FIELD_LEN,
        MessageType::DeleteComponentNetwork => 4 * FIELD_LEN,
        MessageType::DeleteEntityNetwork => 2 * FIELD_LEN,
    }
}

/// Returns the full frame length of a message of `message_type` carrying
/// `payload_len` bytes. The payload length is ignored for types without one.
#[must_use]
pub const fn message_length(message_type: MessageType, payload_len: usize) -> usize {
    let headers = MESSAGE_HEADER_LEN + body_header_len(message_type);
    if message_type.has_payload() {
        headers + payload_len
    } else {
        headers
    }
}

/// Returns the number of bytes `message` occupies on the wire.
#[must_use]
pub fn encoded_len(message: &CrdtMessage) -> usize {
    message_length(message.message_type(), message.data().len())
}
