//! The reconciled state held by one protocol instance.

use bytes::Bytes;
use scene_crdt_types::{compare_bytes, ComponentId, EntityId, Timestamp};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A stored component value and the timestamp it was written at.
///
/// An empty payload marks a deleted component. The tombstone keeps the slot
/// occupied so older writes are still rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityComponentData {
    timestamp: Timestamp,
    data: Bytes,
}

impl EntityComponentData {
    #[must_use]
    pub fn new(timestamp: Timestamp, data: Bytes) -> Self {
        Self { timestamp, data }
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns true if this value is a deletion tombstone.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn into_data(self) -> Bytes {
        self.data
    }

    /// Orders append entries by timestamp, then payload.
    pub(crate) fn cmp_entry(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| compare_bytes(&self.data, &other.data))
    }
}

/// Last-writer-wins slots, append sets and deleted-entity markers.
///
/// All maps are ordered, so iterating the state (and therefore extracting a
/// snapshot) visits entries in the same order on every run: component id,
/// then entity id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrdtState {
    pub(crate) lww: BTreeMap<(ComponentId, EntityId), EntityComponentData>,
    /// Each list is sorted by [`EntityComponentData::cmp_entry`].
    pub(crate) appends: BTreeMap<(ComponentId, EntityId), Vec<EntityComponentData>>,
    /// Entity number to the highest deleted version.
    pub(crate) deleted: BTreeMap<u16, u16>,
    pub(crate) append_count: usize,
}

impl CrdtState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored LWW value for a component, tombstones included.
    #[must_use]
    pub fn lww_component(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> Option<&EntityComponentData> {
        self.lww.get(&(component, entity))
    }

    /// Returns every retained APPEND value for a component, in timestamp then
    /// payload order.
    #[must_use]
    pub fn append_components(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> &[EntityComponentData] {
        self.appends
            .get(&(component, entity))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the highest deleted version recorded for an entity number.
    #[must_use]
    pub fn deleted_version(&self, number: u16) -> Option<u16> {
        self.deleted.get(&number).copied()
    }

    /// Returns true if this exact entity version has been deleted.
    #[must_use]
    pub fn is_entity_deleted(&self, entity: EntityId) -> bool {
        self.deleted_version(entity.number())
            .is_some_and(|version| version >= entity.version())
    }

    /// Iterates LWW slots in component, then entity order.
    pub fn lww_entries(
        &self,
    ) -> impl Iterator<Item = (ComponentId, EntityId, &EntityComponentData)> {
        self.lww
            .iter()
            .map(|(&(component, entity), value)| (component, entity, value))
    }

    /// Iterates every retained APPEND value in component, then entity order.
    pub fn append_entries(
        &self,
    ) -> impl Iterator<Item = (ComponentId, EntityId, &EntityComponentData)> {
        self.appends.iter().flat_map(|(&(component, entity), values)| {
            values.iter().map(move |value| (component, entity, value))
        })
    }

    /// Iterates deleted markers as entity ids, by entity number.
    pub fn deleted_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.deleted
            .iter()
            .map(|(&number, &version)| EntityId::new(number, version))
    }

    /// Returns how many messages a snapshot of this state contains.
    #[must_use]
    pub fn messages_count(&self) -> usize {
        self.lww.len() + self.append_count + self.deleted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages_count() == 0
    }

    /// Empties the state, returning every payload it held.
    pub(crate) fn drain_payloads(&mut self) -> Vec<Bytes> {
        let lww = std::mem::take(&mut self.lww);
        let appends = std::mem::take(&mut self.appends);
        self.deleted.clear();
        self.append_count = 0;

        lww.into_values()
            .chain(appends.into_values().flatten())
            .map(EntityComponentData::into_data)
            .collect()
    }
}
