use scene_crdt_types::{ComponentId, EntityId, Error};
use std::collections::HashSet;
use std::str::FromStr;

// ── EntityId ──────────────────────────────────────────────────────

#[test]
fn entity_id_packs_number_and_version() {
    let id = EntityId::new(512, 3);
    assert_eq!(id.number(), 512);
    assert_eq!(id.version(), 3);
    assert_eq!(id.raw(), (3 << 16) | 512);
}

#[test]
fn entity_id_from_raw_roundtrip() {
    let id = EntityId::from_raw(0x0002_0001);
    assert_eq!(id.number(), 1);
    assert_eq!(id.version(), 2);
    assert_eq!(EntityId::new(1, 2), id);
    assert_eq!(u32::from(id), 0x0002_0001);
}

#[test]
fn entity_id_extremes() {
    let id = EntityId::from_raw(u32::MAX);
    assert_eq!(id.number(), u16::MAX);
    assert_eq!(id.version(), u16::MAX);

    let zero = EntityId::default();
    assert_eq!(zero.number(), 0);
    assert_eq!(zero.version(), 0);
}

#[test]
fn entity_id_next_version_keeps_number() {
    let id = EntityId::new(7, 1);
    let next = id.next_version();
    assert_eq!(next.number(), 7);
    assert_eq!(next.version(), 2);
    assert_ne!(id, next);
}

#[test]
fn entity_id_next_version_wraps() {
    let id = EntityId::new(7, u16::MAX);
    assert_eq!(id.next_version().version(), 0);
}

#[test]
fn entity_id_equality_is_by_raw_value() {
    let mut set = HashSet::new();
    set.insert(EntityId::new(10, 0));
    set.insert(EntityId::from_raw(10));
    set.insert(EntityId::new(10, 1));
    assert_eq!(set.len(), 2);
}

#[test]
fn entity_id_display() {
    assert_eq!(EntityId::new(512, 3).to_string(), "512:3");
    assert_eq!(EntityId::from_raw(0).to_string(), "0:0");
}

#[test]
fn entity_id_parse_number_version() {
    let id = EntityId::from_str("512:3").unwrap();
    assert_eq!(id, EntityId::new(512, 3));
}

#[test]
fn entity_id_parse_raw() {
    let id: EntityId = "65537".parse().unwrap();
    assert_eq!(id, EntityId::new(1, 1));
}

#[test]
fn entity_id_display_and_parse_roundtrip() {
    let id = EntityId::new(40_000, 12);
    let parsed: EntityId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn entity_id_parse_invalid() {
    assert!(matches!(
        EntityId::from_str("abc"),
        Err(Error::InvalidEntityId(_))
    ));
    assert!(EntityId::from_str("1:").is_err());
    assert!(EntityId::from_str("70000:1").is_err());
    assert!(EntityId::from_str("1:70000").is_err());
}

#[test]
fn entity_id_serde_is_transparent() {
    let id = EntityId::new(1, 1);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "65537");
    let back: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

// ── ComponentId ───────────────────────────────────────────────────

#[test]
fn component_id_roundtrip() {
    let id = ComponentId::new(1041);
    assert_eq!(id.raw(), 1041);
    assert_eq!(ComponentId::from(1041), id);
    assert_eq!(u32::from(id), 1041);
    assert_eq!(id.to_string(), "1041");
}

#[test]
fn component_id_ordering() {
    assert!(ComponentId::new(1) < ComponentId::new(2));
}
