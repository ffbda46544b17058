//! Error types for the reconciliation engine.

use scene_crdt_types::{EntityId, MessageType};
use scene_crdt_wire::WireError;
use thiserror::Error;

/// Result type for engine operations.
pub type CrdtResult<T> = Result<T, CrdtError>;

/// Errors surfaced by the engine.
///
/// Rejected or outdated messages are not errors: they come back as a
/// [`crate::StateOutcome`]. These variants cover malformed input and caller
/// contract violations only.
#[derive(Debug, Error)]
pub enum CrdtError {
    /// `enforce_lww_state` was handed a message that is not PUT or DELETE.
    #[error("message type {0} cannot be enforced as last-writer-wins state")]
    NotLwwMessage(MessageType),

    /// `enforce_lww_state` was handed a write for an entity version that has
    /// already been deleted.
    #[error("entity {0} was deleted and cannot be written")]
    EntityDeleted(EntityId),

    /// A frame batch could not be decoded.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
