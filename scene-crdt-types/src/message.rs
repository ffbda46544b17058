//! The CRDT message envelope.
//!
//! A message is the unit of replication: one operation on one
//! (entity, component) pair, stamped with a logical timestamp. Messages are
//! immutable once built; the payload buffer moves with the message into
//! whichever store keeps it.

use crate::{ComponentId, EntityId, Error, Timestamp};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of message types, with their wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum MessageType {
    /// Last-writer-wins write.
    PutComponent = 1,
    /// Last-writer-wins tombstone.
    DeleteComponent = 2,
    /// Removes an entity and every component addressed to it.
    DeleteEntity = 3,
    /// Grow-only set insert; every distinct value is kept.
    AppendComponent = 4,
    /// [`MessageType::PutComponent`] with a network id.
    PutComponentNetwork = 5,
    /// [`MessageType::DeleteComponent`] with a network id.
    DeleteComponentNetwork = 6,
    /// [`MessageType::DeleteEntity`] with a network id.
    DeleteEntityNetwork = 7,
}

/// What a message does to the replicated state, regardless of the header
/// variant it arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    PutComponent,
    DeleteComponent,
    DeleteEntity,
    AppendComponent,
}

impl MessageType {
    /// Parses a wire value.
    pub fn from_u32(value: u32) -> Result<Self, Error> {
        Ok(match value {
            1 => Self::PutComponent,
            2 => Self::DeleteComponent,
            3 => Self::DeleteEntity,
            4 => Self::AppendComponent,
            5 => Self::PutComponentNetwork,
            6 => Self::DeleteComponentNetwork,
            7 => Self::DeleteEntityNetwork,
            other => return Err(Error::UnknownMessageType(other)),
        })
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn operation(self) -> Operation {
        match self {
            Self::PutComponent | Self::PutComponentNetwork => Operation::PutComponent,
            Self::DeleteComponent | Self::DeleteComponentNetwork => Operation::DeleteComponent,
            Self::DeleteEntity | Self::DeleteEntityNetwork => Operation::DeleteEntity,
            Self::AppendComponent => Operation::AppendComponent,
        }
    }

    /// Returns true for the variants whose header carries a network id.
    #[must_use]
    pub const fn is_network(self) -> bool {
        matches!(
            self,
            Self::PutComponentNetwork | Self::DeleteComponentNetwork | Self::DeleteEntityNetwork
        )
    }

    /// Returns the network counterpart of this type, if it has one.
    #[must_use]
    pub const fn to_network(self) -> Option<Self> {
        match self {
            Self::PutComponent | Self::PutComponentNetwork => Some(Self::PutComponentNetwork),
            Self::DeleteComponent | Self::DeleteComponentNetwork => {
                Some(Self::DeleteComponentNetwork)
            }
            Self::DeleteEntity | Self::DeleteEntityNetwork => Some(Self::DeleteEntityNetwork),
            Self::AppendComponent => None,
        }
    }

    /// Returns the local counterpart of this type.
    #[must_use]
    pub const fn to_local(self) -> Self {
        match self.operation() {
            Operation::PutComponent => Self::PutComponent,
            Operation::DeleteComponent => Self::DeleteComponent,
            Operation::DeleteEntity => Self::DeleteEntity,
            Operation::AppendComponent => Self::AppendComponent,
        }
    }

    /// Returns true if messages of this type carry a variable-size payload.
    #[must_use]
    pub const fn has_payload(self) -> bool {
        matches!(
            self.operation(),
            Operation::PutComponent | Operation::AppendComponent
        )
    }

    /// Returns true if messages of this type address a component.
    #[must_use]
    pub const fn has_component(self) -> bool {
        !matches!(self.operation(), Operation::DeleteEntity)
    }
}

impl TryFrom<u32> for MessageType {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value)
    }
}

impl From<MessageType> for u32 {
    fn from(kind: MessageType) -> Self {
        kind.as_u32()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PutComponent => "PUT_COMPONENT",
            Self::DeleteComponent => "DELETE_COMPONENT",
            Self::DeleteEntity => "DELETE_ENTITY",
            Self::AppendComponent => "APPEND_COMPONENT",
            Self::PutComponentNetwork => "PUT_COMPONENT_NETWORK",
            Self::DeleteComponentNetwork => "DELETE_COMPONENT_NETWORK",
            Self::DeleteEntityNetwork => "DELETE_ENTITY_NETWORK",
        };
        f.write_str(name)
    }
}

/// A single CRDT operation.
///
/// Entity deletions carry component `0`, timestamp `0` and no payload;
/// component deletions carry no payload. The constructors enforce both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrdtMessage {
    message_type: MessageType,
    entity_id: EntityId,
    component_id: ComponentId,
    timestamp: Timestamp,
    network_id: Option<u32>,
    data: Bytes,
}

impl CrdtMessage {
    /// Creates a message of any type.
    ///
    /// Payloads passed with a type that carries none are dropped, and the
    /// component and timestamp of entity deletions are zeroed, so equal
    /// operations always compare equal. Network variants start with network
    /// id `0`; use [`CrdtMessage::with_network_id`] to set it.
    #[must_use]
    pub fn new(
        message_type: MessageType,
        entity_id: EntityId,
        component_id: ComponentId,
        timestamp: Timestamp,
        data: Bytes,
    ) -> Self {
        let (component_id, timestamp) = if message_type.has_component() {
            (component_id, timestamp)
        } else {
            (ComponentId::default(), Timestamp::ZERO)
        };

        Self {
            message_type,
            entity_id,
            component_id,
            timestamp,
            network_id: message_type.is_network().then_some(0),
            data: if message_type.has_payload() { data } else { Bytes::new() },
        }
    }

    /// Creates a last-writer-wins write.
    #[must_use]
    pub fn put(
        entity_id: EntityId,
        component_id: ComponentId,
        timestamp: Timestamp,
        data: impl Into<Bytes>,
    ) -> Self {
        Self::new(
            MessageType::PutComponent,
            entity_id,
            component_id,
            timestamp,
            data.into(),
        )
    }

    /// Creates a last-writer-wins tombstone.
    #[must_use]
    pub fn delete_component(
        entity_id: EntityId,
        component_id: ComponentId,
        timestamp: Timestamp,
    ) -> Self {
        Self::new(
            MessageType::DeleteComponent,
            entity_id,
            component_id,
            timestamp,
            Bytes::new(),
        )
    }

    /// Creates an entity deletion.
    #[must_use]
    pub fn delete_entity(entity_id: EntityId) -> Self {
        Self::new(
            MessageType::DeleteEntity,
            entity_id,
            ComponentId::default(),
            Timestamp::ZERO,
            Bytes::new(),
        )
    }

    /// Creates a grow-only set insert.
    #[must_use]
    pub fn append(
        entity_id: EntityId,
        component_id: ComponentId,
        timestamp: Timestamp,
        data: impl Into<Bytes>,
    ) -> Self {
        Self::new(
            MessageType::AppendComponent,
            entity_id,
            component_id,
            timestamp,
            data.into(),
        )
    }

    /// Converts this message to its network variant carrying `network_id`.
    ///
    /// Appends have no network variant and are returned unchanged.
    #[must_use]
    pub fn with_network_id(mut self, network_id: u32) -> Self {
        if let Some(network_type) = self.message_type.to_network() {
            self.message_type = network_type;
            self.network_id = Some(network_id);
        }
        self
    }

    /// Strips the network header variant, keeping the operation.
    #[must_use]
    pub fn into_local(mut self) -> Self {
        self.message_type = self.message_type.to_local();
        self.network_id = None;
        self
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.message_type.operation()
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    #[must_use]
    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the network id of network variants.
    #[must_use]
    pub fn network_id(&self) -> Option<u32> {
        self.network_id
    }

    /// Returns the payload. Empty for types without one.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the message, returning its payload.
    #[must_use]
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for CrdtMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entity={} component={} ts={} len={}",
            self.message_type,
            self.entity_id,
            self.component_id,
            self.timestamp,
            self.data.len()
        )
    }
}
