//! Frame decoding.
//!
//! Payloads are zero-copy slices of the input buffer: a decoded message keeps
//! the frame batch alive until the payload is dropped or replaced.

use crate::error::{WireError, WireResult};
use crate::layout::{body_header_len, MAX_MESSAGE_LENGTH, MESSAGE_HEADER_LEN};
use bytes::{Buf, Bytes};
use scene_crdt_types::{ComponentId, CrdtMessage, EntityId, MessageType, Timestamp};
use tracing::warn;

/// Lazily decodes back-to-back frames from a buffer.
///
/// Yields `Err` at most once: after a decode error the reader stops, since
/// frame boundaries past a malformed frame cannot be trusted.
#[derive(Debug, Clone)]
pub struct MessageReader {
    buf: Bytes,
    offset: usize,
    max_len: usize,
    failed: bool,
}

impl MessageReader {
    /// Creates a reader over `buf` with the default frame-size limit.
    #[must_use]
    pub fn new(buf: Bytes) -> Self {
        Self {
            buf,
            offset: 0,
            max_len: MAX_MESSAGE_LENGTH,
            failed: false,
        }
    }

    /// Sets the largest frame the reader accepts.
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Returns the offset of the next frame within the original buffer.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of undecoded bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }
}

impl Iterator for MessageReader {
    type Item = WireResult<CrdtMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.buf.is_empty() {
            return None;
        }

        match read_frame(&mut self.buf, self.offset, self.max_len) {
            Ok((message, length)) => {
                self.offset += length;
                Some(Ok(message))
            }
            Err(e) => {
                warn!("Dropping CRDT frame batch: {}", e);
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decodes every frame in `buf`.
///
/// An empty buffer yields no messages. Any malformed frame fails the whole
/// buffer.
pub fn decode_all(buf: Bytes) -> WireResult<Vec<CrdtMessage>> {
    MessageReader::new(buf).collect()
}

/// Decodes the first frame of `buf`, advancing it past the frame.
///
/// On error `buf` is left untouched.
pub fn decode_one(buf: &mut Bytes) -> WireResult<CrdtMessage> {
    read_frame(buf, 0, MAX_MESSAGE_LENGTH).map(|(message, _)| message)
}

/// Validates the generic header at the start of `buf` and returns the frame
/// length and type. Does not require the body to be present.
pub(crate) fn read_header(
    buf: &[u8],
    offset: usize,
    max_len: usize,
) -> WireResult<(usize, MessageType)> {
    if buf.len() < MESSAGE_HEADER_LEN {
        return Err(WireError::Truncated {
            offset,
            needed: MESSAGE_HEADER_LEN,
            available: buf.len(),
        });
    }

    let mut header = &buf[..MESSAGE_HEADER_LEN];
    let length = header.get_u32_le() as usize;
    let raw_type = header.get_u32_le();

    let message_type =
        MessageType::from_u32(raw_type).map_err(|_| WireError::UnknownMessageType {
            offset,
            message_type: raw_type,
        })?;

    if length > max_len {
        return Err(WireError::TooLarge {
            offset,
            length,
            limit: max_len,
        });
    }

    let headers = MESSAGE_HEADER_LEN + body_header_len(message_type);
    if length < headers || (!message_type.has_payload() && length != headers) {
        return Err(WireError::InvalidLength { offset, length });
    }

    Ok((length, message_type))
}

fn read_frame(buf: &mut Bytes, offset: usize, max_len: usize) -> WireResult<(CrdtMessage, usize)> {
    let (length, message_type) = read_header(buf, offset, max_len)?;

    if length > buf.len() {
        return Err(WireError::Truncated {
            offset,
            needed: length,
            available: buf.len(),
        });
    }

    let mut body = &buf[MESSAGE_HEADER_LEN..length];
    let entity_id = EntityId::from_raw(body.get_u32_le());

    let message = match message_type {
        MessageType::DeleteEntity => CrdtMessage::delete_entity(entity_id),
        MessageType::DeleteEntityNetwork => {
            let network_id = body.get_u32_le();
            CrdtMessage::delete_entity(entity_id).with_network_id(network_id)
        }
        MessageType::DeleteComponent | MessageType::DeleteComponentNetwork => {
            let component_id = ComponentId::new(body.get_u32_le());
            let timestamp = Timestamp::new(body.get_u32_le());
            let message = CrdtMessage::delete_component(entity_id, component_id, timestamp);
            if message_type.is_network() {
                message.with_network_id(body.get_u32_le())
            } else {
                message
            }
        }
        MessageType::PutComponent
        | MessageType::AppendComponent
        | MessageType::PutComponentNetwork => {
            let component_id = ComponentId::new(body.get_u32_le());
            let timestamp = Timestamp::new(body.get_u32_le());
            let network_id = message_type.is_network().then(|| body.get_u32_le());
            let payload_len = body.get_u32_le() as usize;

            if payload_len != body.remaining() {
                return Err(WireError::PayloadMismatch {
                    offset,
                    frame: length,
                    payload: payload_len,
                });
            }

            let data = buf.slice(length - payload_len..length);
            let message = CrdtMessage::new(message_type, entity_id, component_id, timestamp, data);
            match network_id {
                Some(network_id) => message.with_network_id(network_id),
                None => message,
            }
        }
    };

    buf.advance(length);
    Ok((message, length))
}
