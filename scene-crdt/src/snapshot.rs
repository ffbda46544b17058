//! Full-state extraction.
//!
//! A snapshot is the minimal message list that rebuilds the current state in
//! an empty engine: one PUT or DELETE_COMPONENT per LWW slot, one APPEND per
//! retained value and one DELETE_ENTITY per deleted marker, in that order.

use crate::factory::ProcessedMessage;
use crate::protocol::CrdtProtocol;
use scene_crdt_types::CrdtMessage;

impl CrdtProtocol {
    /// Appends the snapshot of the current state to `out` and returns the
    /// number of messages written.
    ///
    /// # Panics
    ///
    /// Panics if `out` has less than [`CrdtProtocol::messages_count`] spare
    /// capacity. Callers preallocate so extraction never reallocates.
    pub fn create_messages_from_current_state(&self, out: &mut Vec<ProcessedMessage>) -> usize {
        let count = self.messages_count();
        let spare = out.capacity() - out.len();
        assert!(
            spare >= count,
            "snapshot needs {count} free slots, the output vector has {spare}"
        );

        let lww = self.state.lww_entries().map(|(component, entity, value)| {
            if value.is_deleted() {
                CrdtMessage::delete_component(entity, component, value.timestamp())
            } else {
                CrdtMessage::put(entity, component, value.timestamp(), value.data().clone())
            }
        });
        let appends = self.state.append_entries().map(|(component, entity, value)| {
            CrdtMessage::append(entity, component, value.timestamp(), value.data().clone())
        });
        let deleted = self.state.deleted_entities().map(CrdtMessage::delete_entity);

        let start = out.len();
        out.extend(lww.chain(appends).chain(deleted).map(ProcessedMessage::new));
        out.len() - start
    }

    /// Returns the snapshot of the current state in a new vector.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProcessedMessage> {
        let mut out = Vec::with_capacity(self.messages_count());
        self.create_messages_from_current_state(&mut out);
        out
    }
}
