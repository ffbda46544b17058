//! Property-based tests for reconciliation correctness.
//!
//! These tests verify the properties every replica relies on:
//! - Commutativity: applying the same messages in any order gives the same state
//! - Idempotence: reapplying messages changes nothing
//! - Monotonicity: older timestamps never overwrite newer ones
//!
//! Additionally, we verify that a snapshot of any state rebuilds that state
//! in an empty replica.

use proptest::prelude::*;
use scene_crdt::{
    ComponentId, CrdtMessage, CrdtProtocol, EntityId, StateOutcome, Timestamp,
};
use scene_crdt_types::compare_bytes;
use scene_crdt_wire::encode_all;
use std::collections::BTreeSet;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn entity_strategy() -> impl Strategy<Value = EntityId> {
    (0u16..4, 0u16..3).prop_map(|(number, version)| EntityId::new(number, version))
}

fn component_strategy() -> impl Strategy<Value = ComponentId> {
    (1u32..4).prop_map(ComponentId::new)
}

fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
    (0u32..8).prop_map(Timestamp::new)
}

fn data_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4)
}

fn message_strategy() -> impl Strategy<Value = CrdtMessage> {
    prop_oneof![
        4 => (entity_strategy(), component_strategy(), timestamp_strategy(), data_strategy())
            .prop_map(|(e, c, t, d)| CrdtMessage::put(e, c, t, d)),
        2 => (entity_strategy(), component_strategy(), timestamp_strategy())
            .prop_map(|(e, c, t)| CrdtMessage::delete_component(e, c, t)),
        1 => entity_strategy().prop_map(CrdtMessage::delete_entity),
        2 => (entity_strategy(), component_strategy(), timestamp_strategy(), data_strategy())
            .prop_map(|(e, c, t, d)| CrdtMessage::append(e, c, t, d)),
    ]
}

fn messages_and_shuffle() -> impl Strategy<Value = (Vec<CrdtMessage>, Vec<CrdtMessage>)> {
    prop::collection::vec(message_strategy(), 0..40)
        .prop_flat_map(|messages| (Just(messages.clone()), Just(messages).prop_shuffle()))
}

fn apply_all(messages: &[CrdtMessage]) -> CrdtProtocol {
    let mut protocol = CrdtProtocol::new();
    for message in messages {
        protocol.process_message(message.clone());
    }
    protocol
}

// =============================================================================
// LWW PROPERTY TESTS
// =============================================================================

mod lww_properties {
    use super::*;
    use pretty_assertions::assert_eq;

    const E: EntityId = EntityId::new(1, 0);
    const C: ComponentId = ComponentId::new(1);

    proptest! {
        /// Any arrival order of the same messages converges to the same state
        #[test]
        fn reconciliation_is_commutative((messages, shuffled) in messages_and_shuffle()) {
            let a = apply_all(&messages);
            let b = apply_all(&shuffled);

            assert_eq!(a.state(), b.state());
        }

        /// Reapplying every message changes nothing
        #[test]
        fn reconciliation_is_idempotent(messages in prop::collection::vec(message_strategy(), 0..40)) {
            let mut protocol = apply_all(&messages);
            let before = protocol.state().clone();

            for message in &messages {
                let r = protocol.process_message(message.clone());
                prop_assert!(!r.changed_state(), "reapplying {} gave {:?}", message, r);
            }

            assert_eq!(protocol.state(), &before);
        }

        /// An older timestamp is always rejected
        #[test]
        fn older_timestamp_is_rejected(
            newer in 1u32..1000,
            age in 1u32..1000,
            d1 in data_strategy(),
            d2 in data_strategy(),
        ) {
            let older = newer.saturating_sub(age);
            prop_assume!(older < newer);
            let mut protocol = CrdtProtocol::new();
            protocol.process_message(CrdtMessage::put(E, C, Timestamp::new(newer), d1.clone()));

            let r = protocol.process_message(CrdtMessage::put(E, C, Timestamp::new(older), d2));

            prop_assert_eq!(r.outcome, StateOutcome::StateOutdatedTimestamp);
            let stored = protocol.state().lww_component(E, C).unwrap();
            prop_assert_eq!(stored.data().to_vec(), d1);
        }

        /// Equal timestamps settle on the greater payload in either order
        #[test]
        fn tie_break_is_deterministic(
            ts in timestamp_strategy(),
            d1 in data_strategy(),
            d2 in data_strategy(),
        ) {
            let m1 = CrdtMessage::put(E, C, ts, d1.clone());
            let m2 = CrdtMessage::put(E, C, ts, d2.clone());
            let expected = if compare_bytes(&d1, &d2).is_ge() { d1 } else { d2 };

            let a = apply_all(&[m1.clone(), m2.clone()]);
            let b = apply_all(&[m2, m1]);

            prop_assert_eq!(a.state().lww_component(E, C).unwrap().data().to_vec(), expected);
            assert_eq!(a.state(), b.state());
        }
    }
}

// =============================================================================
// ENTITY DELETION PROPERTY TESTS
// =============================================================================

mod deletion_properties {
    use super::*;
    use pretty_assertions::assert_eq;

    proptest! {
        /// Nothing at or below a deleted version is accepted again;
        /// anything above it is
        #[test]
        fn deletion_is_final(
            number in any::<u16>(),
            deleted in 0u16..u16::MAX,
            version in any::<u16>(),
            ts in timestamp_strategy(),
            data in data_strategy(),
        ) {
            let mut protocol = CrdtProtocol::new();
            protocol.process_message(CrdtMessage::delete_entity(EntityId::new(number, deleted)));

            let target = EntityId::new(number, version);
            let c = ComponentId::new(1);
            let results = [
                protocol.process_message(CrdtMessage::put(target, c, ts, data.clone())),
                protocol.process_message(CrdtMessage::append(target, c, ts, data)),
            ];

            for r in results {
                if version <= deleted {
                    prop_assert_eq!(r.outcome, StateOutcome::EntityWasDeleted);
                } else {
                    prop_assert_ne!(r.outcome, StateOutcome::EntityWasDeleted);
                }
            }
        }

        /// A deletion removes every earlier component of that entity number
        #[test]
        fn deletion_purges_covered_versions(
            messages in prop::collection::vec(message_strategy(), 0..40),
            target in entity_strategy(),
        ) {
            let mut protocol = apply_all(&messages);
            protocol.process_message(CrdtMessage::delete_entity(target));

            let marker = protocol.state().deleted_version(target.number()).unwrap();
            for processed in protocol.snapshot() {
                let entity = processed.message.entity_id();
                if entity.number() == target.number() && processed.message.component_id().raw() != 0 {
                    prop_assert!(entity.version() > marker);
                }
            }
        }
    }
}

// =============================================================================
// APPEND PROPERTY TESTS
// =============================================================================

mod append_properties {
    use super::*;
    use pretty_assertions::assert_eq;

    proptest! {
        /// Every distinct append survives and appears in the snapshot
        #[test]
        fn appends_accumulate(
            values in prop::collection::btree_set((timestamp_strategy(), data_strategy()), 0..60)
        ) {
            let e = EntityId::new(1, 0);
            let c = ComponentId::new(1);
            let mut protocol = CrdtProtocol::new();
            for (ts, data) in &values {
                let r = protocol.process_message(CrdtMessage::append(e, c, *ts, data.clone()));
                prop_assert_eq!(r.outcome, StateOutcome::StateAppendedData);
            }

            let snapshot: BTreeSet<_> = protocol
                .snapshot()
                .into_iter()
                .map(|p| (p.message.timestamp(), p.message.data().to_vec()))
                .collect();

            prop_assert_eq!(snapshot, values);
        }
    }
}

// =============================================================================
// SNAPSHOT PROPERTY TESTS
// =============================================================================

mod snapshot_properties {
    use super::*;
    use pretty_assertions::assert_eq;

    proptest! {
        /// Replaying a snapshot into an empty replica rebuilds the state
        #[test]
        fn snapshot_roundtrip(messages in prop::collection::vec(message_strategy(), 0..40)) {
            let source = apply_all(&messages);
            let snapshot = source.snapshot();
            prop_assert_eq!(snapshot.len(), source.messages_count());

            let mut replica = CrdtProtocol::new();
            for processed in snapshot {
                replica.process_message(processed.into_message());
            }

            assert_eq!(replica.state(), source.state());
        }

        /// The same holds when the snapshot travels as one wire buffer
        #[test]
        fn snapshot_roundtrip_over_the_wire(messages in prop::collection::vec(message_strategy(), 0..40)) {
            let source = apply_all(&messages);
            let snapshot = source.snapshot();
            let buf = encode_all(snapshot.iter().map(|p| &p.message)).unwrap();

            let mut replica = CrdtProtocol::new();
            replica.process_buffer(buf).unwrap();

            assert_eq!(replica.state(), source.state());
        }
    }
}
