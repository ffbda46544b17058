//! Frame encoding.

use crate::error::{WireError, WireResult};
use crate::layout::encoded_len;
use bytes::{BufMut, Bytes, BytesMut};
use scene_crdt_types::{CrdtMessage, MessageType};

/// Appends the frame for `message` to `dst`, returning the bytes written.
pub fn encode(message: &CrdtMessage, dst: &mut BytesMut) -> WireResult<usize> {
    let length = checked_len(message)?;
    dst.reserve(length);
    write_frame(message, length, dst);
    Ok(length)
}

/// Writes the frame for `message` at the start of `dst`, returning the bytes
/// written. Fails without writing if `dst` is too small.
pub fn encode_to_slice(message: &CrdtMessage, dst: &mut [u8]) -> WireResult<usize> {
    let length = checked_len(message)?;
    if dst.len() < length {
        return Err(WireError::BufferTooSmall {
            needed: length,
            available: dst.len(),
        });
    }

    let mut cursor = &mut dst[..length];
    write_frame(message, length, &mut cursor);
    Ok(length)
}

/// Encodes `messages` back to back into one buffer.
pub fn encode_all<'a, I>(messages: I) -> WireResult<Bytes>
where
    I: IntoIterator<Item = &'a CrdtMessage>,
{
    let mut buf = BytesMut::new();
    for message in messages {
        encode(message, &mut buf)?;
    }
    Ok(buf.freeze())
}

fn checked_len(message: &CrdtMessage) -> WireResult<usize> {
    let length = encoded_len(message);
    u32::try_from(length).map_err(|_| WireError::LengthOverflow(length))?;
    Ok(length)
}

/// `length` must already be known to fit in a `u32`.
fn write_frame<B: BufMut>(message: &CrdtMessage, length: usize, dst: &mut B) {
    let message_type = message.message_type();
    let network_id = message.network_id().unwrap_or_default();

    dst.put_u32_le(length as u32);
    dst.put_u32_le(message_type.as_u32());
    dst.put_u32_le(message.entity_id().raw());

    match message_type {
        MessageType::DeleteEntity => {}
        MessageType::DeleteEntityNetwork => dst.put_u32_le(network_id),
        MessageType::DeleteComponent => {
            dst.put_u32_le(message.component_id().raw());
            dst.put_u32_le(message.timestamp().value());
        }
        MessageType::DeleteComponentNetwork => {
            dst.put_u32_le(message.component_id().raw());
            dst.put_u32_le(message.timestamp().value());
            dst.put_u32_le(network_id);
        }
        MessageType::PutComponent | MessageType::AppendComponent => {
            dst.put_u32_le(message.component_id().raw());
            dst.put_u32_le(message.timestamp().value());
            dst.put_u32_le(message.data().len() as u32);
            dst.put_slice(message.data());
        }
        MessageType::PutComponentNetwork => {
            dst.put_u32_le(message.component_id().raw());
            dst.put_u32_le(message.timestamp().value());
            dst.put_u32_le(network_id);
            dst.put_u32_le(message.data().len() as u32);
            dst.put_slice(message.data());
        }
    }
}
