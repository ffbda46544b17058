//! CRDT reconciliation engine for replicated scene state.
//!
//! A [`CrdtProtocol`] holds the authoritative state of one scene and folds
//! messages from any number of peers into it:
//!
//! - LWW components: one value per (entity, component), highest timestamp
//!   wins, ties broken by payload order
//! - APPEND components: a grow-only set of (timestamp, payload) values
//! - Deleted entities: a version marker per entity number that purges and
//!   then blocks older versions
//!
//! Reconciliation satisfies the following properties:
//! - **Commutative**: the final state does not depend on arrival order
//! - **Idempotent**: reprocessing a message changes nothing
//! - **Deterministic**: equal inputs produce equal state and equal snapshots
//!
//! These properties ensure that every replica converges to the same state
//! once it has seen the same set of messages.
//!
//! The current state can be extracted as a message list
//! ([`CrdtProtocol::snapshot`]) to bring a fresh peer up to date.

mod config;
mod error;
mod factory;
mod pool;
mod protocol;
mod result;
mod snapshot;
mod state;

pub use config::ProtocolConfig;
pub use error::{CrdtError, CrdtResult};
pub use factory::ProcessedMessage;
pub use pool::{HeapPool, PayloadPool, SizeClassPool};
pub use protocol::CrdtProtocol;
pub use result::{ReconciliationEffect, ReconciliationResult, StateOutcome};
pub use state::{CrdtState, EntityComponentData};

pub use scene_crdt_types::{ComponentId, CrdtMessage, EntityId, MessageType, Timestamp};
