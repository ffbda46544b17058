//! Builders for outgoing messages.

use crate::protocol::CrdtProtocol;
use bytes::Bytes;
use scene_crdt_types::{ComponentId, CrdtMessage, EntityId, Timestamp};
use scene_crdt_wire::encoded_len;

/// A message ready for serialization, with its frame length precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMessage {
    pub message: CrdtMessage,
    pub encoded_len: usize,
}

impl ProcessedMessage {
    #[must_use]
    pub fn new(message: CrdtMessage) -> Self {
        let encoded_len = encoded_len(&message);
        Self {
            message,
            encoded_len,
        }
    }

    #[must_use]
    pub fn into_message(self) -> CrdtMessage {
        self.message
    }
}

impl From<CrdtMessage> for ProcessedMessage {
    fn from(message: CrdtMessage) -> Self {
        Self::new(message)
    }
}

impl CrdtProtocol {
    /// Builds a PUT that supersedes the stored value. The state is untouched.
    #[must_use]
    pub fn create_put_message(
        &self,
        entity: EntityId,
        component: ComponentId,
        data: impl Into<Bytes>,
    ) -> ProcessedMessage {
        let timestamp = self.next_timestamp(entity, component);
        ProcessedMessage::new(CrdtMessage::put(entity, component, timestamp, data))
    }

    /// Builds a DELETE_COMPONENT that supersedes the stored value.
    #[must_use]
    pub fn create_delete_message(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> ProcessedMessage {
        let timestamp = self.next_timestamp(entity, component);
        ProcessedMessage::new(CrdtMessage::delete_component(entity, component, timestamp))
    }

    /// Builds an APPEND with a caller-chosen timestamp.
    #[must_use]
    pub fn create_append_message(
        &self,
        entity: EntityId,
        component: ComponentId,
        timestamp: Timestamp,
        data: impl Into<Bytes>,
    ) -> ProcessedMessage {
        ProcessedMessage::new(CrdtMessage::append(entity, component, timestamp, data))
    }

    #[must_use]
    pub fn create_delete_entity_message(&self, entity: EntityId) -> ProcessedMessage {
        ProcessedMessage::new(CrdtMessage::delete_entity(entity))
    }

    fn next_timestamp(&self, entity: EntityId, component: ComponentId) -> Timestamp {
        self.state
            .lww_component(entity, component)
            .map_or(Timestamp::ZERO, |stored| stored.timestamp().next())
    }
}
