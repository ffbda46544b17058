//! Frame-level filtering of encoded batches.
//!
//! Some components are local to a scene and must never be forwarded to other
//! peers. Filtering works on the encoded bytes directly: kept frames are
//! copied through verbatim and nothing is decoded beyond the headers.

use crate::decode::read_header;
use crate::error::{WireError, WireResult};
use crate::layout::{MAX_MESSAGE_LENGTH, MESSAGE_HEADER_LEN};
use bytes::{Buf, BytesMut};
use scene_crdt_types::{ComponentId, EntityId, MessageType};

/// Component id reserved for state that stays on the local peer.
pub const NO_SYNC_COMPONENT_ID: ComponentId = ComponentId::new(2_092_194_694);

/// The addressing part of a frame, read without touching its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Total frame length including the generic header.
    pub length: usize,
    pub message_type: MessageType,
    pub entity_id: EntityId,
    /// `None` for entity deletions.
    pub component_id: Option<ComponentId>,
}

impl FrameHeader {
    /// Reads the header of the first frame in `buf`.
    ///
    /// Fails if the frame is malformed or extends past the end of `buf`.
    pub fn peek(buf: &[u8]) -> WireResult<Self> {
        Self::peek_at(buf, 0)
    }

    fn peek_at(buf: &[u8], offset: usize) -> WireResult<Self> {
        let (length, message_type) = read_header(buf, offset, MAX_MESSAGE_LENGTH)?;
        if length > buf.len() {
            return Err(WireError::Truncated {
                offset,
                needed: length,
                available: buf.len(),
            });
        }

        let mut body = &buf[MESSAGE_HEADER_LEN..length];
        let entity_id = EntityId::from_raw(body.get_u32_le());
        let component_id = message_type
            .has_component()
            .then(|| ComponentId::new(body.get_u32_le()));

        Ok(Self {
            length,
            message_type,
            entity_id,
            component_id,
        })
    }
}

/// Copies the frames of `input` for which `keep` returns true into `output`.
///
/// Returns the number of bytes appended. On a malformed frame `output` is
/// restored to its previous length and the error returned.
pub fn filter_message_batch<F>(input: &[u8], output: &mut BytesMut, mut keep: F) -> WireResult<usize>
where
    F: FnMut(&FrameHeader) -> bool,
{
    let start = output.len();
    let mut offset = 0;

    while offset < input.len() {
        let header = match FrameHeader::peek_at(&input[offset..], offset) {
            Ok(header) => header,
            Err(e) => {
                output.truncate(start);
                return Err(e);
            }
        };

        if keep(&header) {
            output.extend_from_slice(&input[offset..offset + header.length]);
        }
        offset += header.length;
    }

    Ok(output.len() - start)
}

/// Drops every frame addressed to [`NO_SYNC_COMPONENT_ID`].
pub fn drop_no_sync_components(input: &[u8], output: &mut BytesMut) -> WireResult<usize> {
    filter_message_batch(input, output, |header| {
        header.component_id != Some(NO_SYNC_COMPONENT_ID)
    })
}
