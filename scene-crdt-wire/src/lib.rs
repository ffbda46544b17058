//! Binary wire codec for scene CRDT messages.
//!
//! Every frame starts with an 8-byte generic header followed by a
//! type-specific body. All integers are little-endian `u32`.
//!
//! ```text
//! generic header            [length][type]
//! PUT / APPEND              [entity][component][timestamp][data_len] data
//! DELETE_COMPONENT          [entity][component][timestamp]
//! DELETE_ENTITY             [entity]
//! PUT_NETWORK               [entity][component][timestamp][network_id][data_len] data
//! DELETE_COMPONENT_NETWORK  [entity][component][timestamp][network_id]
//! DELETE_ENTITY_NETWORK     [entity][network_id]
//! ```
//!
//! `length` counts the whole frame including the generic header, so a buffer
//! holding several back-to-back frames can be walked without understanding
//! every body.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use scene_crdt_types::{ComponentId, CrdtMessage, EntityId, Timestamp};
//! use scene_crdt_wire::{decode_all, encode, encoded_len};
//!
//! let msg = CrdtMessage::put(EntityId::new(512, 0), ComponentId::new(1), Timestamp::new(3), vec![7u8]);
//! let mut buf = BytesMut::with_capacity(encoded_len(&msg));
//! encode(&msg, &mut buf).unwrap();
//!
//! let decoded = decode_all(buf.freeze()).unwrap();
//! assert_eq!(decoded, vec![msg]);
//! ```

mod decode;
mod encode;
mod error;
mod filter;
mod layout;

pub use decode::{decode_all, decode_one, MessageReader};
pub use encode::{encode, encode_all, encode_to_slice};
pub use error::{WireError, WireResult};
pub use filter::{drop_no_sync_components, filter_message_batch, FrameHeader, NO_SYNC_COMPONENT_ID};
pub use layout::{
    body_header_len, encoded_len, message_length, MAX_MESSAGE_LENGTH, MESSAGE_HEADER_LEN,
};
