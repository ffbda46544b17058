//! Reconciliation outcomes.

use serde::{Deserialize, Serialize};

/// How a message related to the state it was reconciled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateOutcome {
    /// The message matched the stored state exactly.
    NoChanges,
    /// The message carried a newer timestamp and replaced the stored value.
    StateUpdatedTimestamp,
    /// The message carried an older timestamp and was discarded.
    StateOutdatedTimestamp,
    /// Equal timestamps; the incoming payload ordered higher and won.
    StateUpdatedData,
    /// Equal timestamps; the stored payload ordered higher and was kept.
    StateOutdatedData,
    /// The addressed entity was already deleted at this version or later.
    EntityWasDeleted,
    /// The message deleted the entity.
    EntityDeleted,
    /// The message added a new value to an append-only component.
    StateAppendedData,
}

/// What the consumer must do to its own world representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationEffect {
    NoChanges,
    EntityDeleted,
    ComponentAdded,
    ComponentModified,
    ComponentDeleted,
}

/// The result of reconciling one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub outcome: StateOutcome,
    pub effect: ReconciliationEffect,
}

impl ReconciliationResult {
    pub const NO_CHANGES: Self = Self::new(StateOutcome::NoChanges, ReconciliationEffect::NoChanges);

    pub const ENTITY_WAS_DELETED: Self =
        Self::new(StateOutcome::EntityWasDeleted, ReconciliationEffect::NoChanges);

    #[must_use]
    pub const fn new(outcome: StateOutcome, effect: ReconciliationEffect) -> Self {
        Self { outcome, effect }
    }

    /// Returns true if the stored state changed.
    #[must_use]
    pub const fn changed_state(&self) -> bool {
        matches!(
            self.outcome,
            StateOutcome::StateUpdatedTimestamp
                | StateOutcome::StateUpdatedData
                | StateOutcome::EntityDeleted
                | StateOutcome::StateAppendedData
        )
    }
}
