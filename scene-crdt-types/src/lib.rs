//! Core type definitions for the scene CRDT protocol.
//!
//! This crate defines the value types shared by the wire codec and the
//! reconciliation engine:
//! - Entity and component identifiers
//! - Lamport-style message timestamps
//! - The CRDT message envelope and its closed set of message types
//! - The payload comparator used as the last-writer-wins tie-break
//!
//! It knows nothing about byte layouts or merge state; those live in
//! `scene-crdt-wire` and `scene-crdt` respectively.

mod compare;
mod ids;
mod message;
mod timestamp;

pub use compare::{compare_bytes, compare_data};
pub use ids::{ComponentId, EntityId};
pub use message::{CrdtMessage, MessageType, Operation};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown message type: {0}")]
    UnknownMessageType(u32),

    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),
}
