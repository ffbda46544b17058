//! Message reconciliation.
//!
//! [`CrdtProtocol`] folds incoming messages into a [`CrdtState`]:
//!
//! - PUT and DELETE_COMPONENT share one last-writer-wins slot per
//!   (entity, component). The higher timestamp wins; equal timestamps fall
//!   back to the payload order of [`compare_data`].
//! - DELETE_ENTITY records a per-number version marker and purges everything
//!   stored for that number at or below the version. Any later message for a
//!   version at or below the marker is rejected.
//! - APPEND_COMPONENT grows a set per (entity, component); duplicates of an
//!   identical (timestamp, payload) pair are ignored.
//!
//! Network header variants reconcile exactly like their local counterparts.

use crate::config::ProtocolConfig;
use crate::error::{CrdtError, CrdtResult};
use crate::pool::{HeapPool, PayloadPool};
use crate::result::{ReconciliationEffect, ReconciliationResult, StateOutcome};
use crate::state::{CrdtState, EntityComponentData};
use bytes::Bytes;
use scene_crdt_types::{compare_data, ComponentId, CrdtMessage, EntityId, Operation};
use scene_crdt_wire::{MessageReader, WireResult};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tracing::{debug, trace};

/// The reconciliation engine for one scene.
///
/// Not internally synchronized: every mutation takes `&mut self`. Each scene
/// owns its own instance and drives it from a single worker.
#[derive(Debug)]
pub struct CrdtProtocol {
    pub(crate) state: CrdtState,
    config: ProtocolConfig,
    pub(crate) pool: Arc<dyn PayloadPool>,
}

impl CrdtProtocol {
    /// Creates an empty engine with the default configuration and heap pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ProtocolConfig::default())
    }

    /// Creates an empty engine with the given configuration.
    #[must_use]
    pub fn with_config(config: ProtocolConfig) -> Self {
        Self {
            state: CrdtState::new(),
            config,
            pool: Arc::new(HeapPool),
        }
    }

    /// Replaces the payload pool. Intended for construction only.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<dyn PayloadPool>) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Returns the reconciled state.
    #[must_use]
    pub fn state(&self) -> &CrdtState {
        &self.state
    }

    /// Returns how many messages [`CrdtProtocol::create_messages_from_current_state`]
    /// will emit.
    #[must_use]
    pub fn messages_count(&self) -> usize {
        self.state.messages_count()
    }

    /// Reconciles one message against the stored state.
    ///
    /// Never fails: rejected and outdated messages are reported through the
    /// returned [`StateOutcome`]. The message's payload is either moved into
    /// the state or handed back to the pool.
    pub fn process_message(&mut self, message: CrdtMessage) -> ReconciliationResult {
        if self.state.is_entity_deleted(message.entity_id()) {
            trace!("Rejected {} for deleted entity", message);
            self.pool.release(message.into_data());
            return ReconciliationResult::ENTITY_WAS_DELETED;
        }

        match message.operation() {
            Operation::PutComponent | Operation::DeleteComponent => self.update_lww(message),
            Operation::DeleteEntity => self.delete_entity(message.entity_id()),
            Operation::AppendComponent => self.append_component(message),
        }
    }

    /// Stores a PUT or DELETE_COMPONENT as the authoritative value, skipping
    /// the timestamp check.
    ///
    /// Used for messages produced locally, which must win over anything
    /// previously stored. Writes for a deleted entity version are refused with
    /// [`CrdtError::EntityDeleted`]: the slot would be purged again by the
    /// deleted marker when a snapshot is replayed.
    pub fn enforce_lww_state(&mut self, message: CrdtMessage) -> CrdtResult<()> {
        let message_type = message.message_type();
        if !matches!(
            message.operation(),
            Operation::PutComponent | Operation::DeleteComponent
        ) {
            self.pool.release(message.into_data());
            return Err(CrdtError::NotLwwMessage(message_type));
        }

        let entity = message.entity_id();
        if self.state.is_entity_deleted(entity) {
            trace!("Refused to enforce {} for deleted entity", message);
            self.pool.release(message.into_data());
            return Err(CrdtError::EntityDeleted(entity));
        }

        debug!("Enforcing {}", message);
        let key = (message.component_id(), message.entity_id());
        let value = EntityComponentData::new(message.timestamp(), message.into_data());
        if let Some(previous) = self.state.lww.insert(key, value) {
            self.pool.release(previous.into_data());
        }
        Ok(())
    }

    /// Decodes a batch of frames and reconciles every message in order.
    ///
    /// Nothing is applied if any frame fails to decode. Payloads are copied
    /// out of `buf` so stored values never keep the whole batch alive.
    pub fn process_buffer(&mut self, buf: Bytes) -> CrdtResult<Vec<ReconciliationResult>> {
        let messages = MessageReader::new(buf)
            .with_max_len(self.config.max_message_length)
            .collect::<WireResult<Vec<_>>>()?;

        Ok(messages
            .into_iter()
            .map(|message| {
                let message = self.detach_payload(message);
                self.process_message(message)
            })
            .collect())
    }

    /// Returns every LWW value stored for `entity`, tombstones included, in
    /// component order.
    #[must_use]
    pub fn state_for_entity(&self, entity: EntityId) -> Vec<(ComponentId, &EntityComponentData)> {
        self.state
            .lww_entries()
            .filter(|&(_, stored_entity, _)| stored_entity == entity)
            .map(|(component, _, value)| (component, value))
            .collect()
    }

    /// Clears the state and hands every retained payload back to the pool.
    pub fn dispose(&mut self) {
        let payloads = self.state.drain_payloads();
        debug!("Disposing protocol state, releasing {} payloads", payloads.len());
        for data in payloads {
            self.pool.release(data);
        }
    }

    fn update_lww(&mut self, message: CrdtMessage) -> ReconciliationResult {
        let is_delete = message.operation() == Operation::DeleteComponent;
        let key = (message.component_id(), message.entity_id());
        let timestamp = message.timestamp();
        let data = message.into_data();

        let stored = match self.state.lww.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(EntityComponentData::new(timestamp, data));
                let effect = if is_delete {
                    ReconciliationEffect::ComponentDeleted
                } else {
                    ReconciliationEffect::ComponentAdded
                };
                return ReconciliationResult::new(StateOutcome::StateUpdatedTimestamp, effect);
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let outcome = match timestamp.cmp(&stored.timestamp()) {
            Ordering::Greater => StateOutcome::StateUpdatedTimestamp,
            Ordering::Less => {
                trace!(
                    "Outdated timestamp {} < {} for entity {} component {}",
                    timestamp,
                    stored.timestamp(),
                    key.1,
                    key.0
                );
                self.pool.release(data);
                return ReconciliationResult::new(
                    StateOutcome::StateOutdatedTimestamp,
                    ReconciliationEffect::NoChanges,
                );
            }
            Ordering::Equal => match compare_data(Some(data.as_ref()), Some(stored.data().as_ref())) {
                Ordering::Greater => StateOutcome::StateUpdatedData,
                Ordering::Equal => {
                    self.pool.release(data);
                    return ReconciliationResult::NO_CHANGES;
                }
                Ordering::Less => {
                    trace!(
                        "Outdated data at timestamp {} for entity {} component {}",
                        timestamp,
                        key.1,
                        key.0
                    );
                    self.pool.release(data);
                    return ReconciliationResult::new(
                        StateOutcome::StateOutdatedData,
                        ReconciliationEffect::NoChanges,
                    );
                }
            },
        };

        let previous = std::mem::replace(stored, EntityComponentData::new(timestamp, data));
        self.pool.release(previous.into_data());

        let effect = if is_delete && outcome == StateOutcome::StateUpdatedTimestamp {
            ReconciliationEffect::ComponentDeleted
        } else {
            ReconciliationEffect::ComponentModified
        };
        ReconciliationResult::new(outcome, effect)
    }

    fn delete_entity(&mut self, entity: EntityId) -> ReconciliationResult {
        let number = entity.number();
        let version = entity.version();
        self.state.deleted.insert(number, version);

        let covered = |stored: &EntityId| stored.number() == number && stored.version() <= version;

        let lww_keys: Vec<_> = self
            .state
            .lww
            .keys()
            .filter(|(_, stored)| covered(stored))
            .copied()
            .collect();
        let append_keys: Vec<_> = self
            .state
            .appends
            .keys()
            .filter(|(_, stored)| covered(stored))
            .copied()
            .collect();

        let mut purged = 0;
        for key in lww_keys {
            if let Some(value) = self.state.lww.remove(&key) {
                self.pool.release(value.into_data());
                purged += 1;
            }
        }
        for key in append_keys {
            if let Some(values) = self.state.appends.remove(&key) {
                self.state.append_count -= values.len();
                purged += values.len();
                for value in values {
                    self.pool.release(value.into_data());
                }
            }
        }

        debug!("Deleted entity {}, purged {} entries", entity, purged);
        ReconciliationResult::new(StateOutcome::EntityDeleted, ReconciliationEffect::EntityDeleted)
    }

    fn append_component(&mut self, message: CrdtMessage) -> ReconciliationResult {
        let key = (message.component_id(), message.entity_id());
        let value = EntityComponentData::new(message.timestamp(), message.into_data());
        let values = self.state.appends.entry(key).or_default();

        let index = match values.binary_search_by(|probe| probe.cmp_entry(&value)) {
            Ok(_) => {
                trace!(
                    "Duplicate append at timestamp {} for entity {} component {}",
                    value.timestamp(),
                    key.1,
                    key.0
                );
                self.pool.release(value.into_data());
                return ReconciliationResult::NO_CHANGES;
            }
            Err(index) => index,
        };

        let index = match self.config.append_capacity {
            Some(capacity) if values.len() >= capacity => {
                debug!(
                    "Append capacity {} reached for entity {} component {}, resetting",
                    capacity, key.1, key.0
                );
                self.state.append_count -= values.len();
                for stale in values.drain(..) {
                    self.pool.release(stale.into_data());
                }
                0
            }
            _ => index,
        };

        values.insert(index, value);
        self.state.append_count += 1;
        ReconciliationResult::new(
            StateOutcome::StateAppendedData,
            ReconciliationEffect::ComponentAdded,
        )
    }

    /// Moves a decoded payload into a buffer owned by the pool.
    fn detach_payload(&self, message: CrdtMessage) -> CrdtMessage {
        if message.data().is_empty() {
            return message;
        }
        let data = self.pool.copy_from(message.data());
        let detached = CrdtMessage::new(
            message.message_type().to_local(),
            message.entity_id(),
            message.component_id(),
            message.timestamp(),
            data,
        );
        match message.network_id() {
            Some(network_id) => detached.with_network_id(network_id),
            None => detached,
        }
    }
}

impl Default for CrdtProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CrdtProtocol {
    fn drop(&mut self) {
        if !self.state.is_empty() {
            self.dispose();
        }
    }
}
