use proptest::prelude::*;
use scene_crdt_types::{compare_bytes, compare_data};
use std::cmp::Ordering;

// ── Null and empty handling ──────────────────────────────────────

#[test]
fn none_equals_none() {
    assert_eq!(compare_data(None, None), Ordering::Equal);
}

#[test]
fn none_is_less_than_some() {
    assert_eq!(compare_data(None, Some(&[])), Ordering::Less);
    assert_eq!(compare_data(Some(&[]), None), Ordering::Greater);
    assert_eq!(compare_data(None, Some(&[0])), Ordering::Less);
}

#[test]
fn empty_is_less_than_non_empty() {
    assert_eq!(compare_data(Some(&[]), Some(&[0])), Ordering::Less);
    assert_eq!(compare_data(Some(&[0]), Some(&[])), Ordering::Greater);
    assert_eq!(compare_data(Some(&[]), Some(&[])), Ordering::Equal);
}

// ── Byte ordering ────────────────────────────────────────────────

#[test]
fn bytes_compare_unsigned() {
    // 0x80 would be negative as a signed byte; it must still win.
    assert_eq!(compare_bytes(&[0x80], &[0x7F]), Ordering::Greater);
    assert_eq!(compare_bytes(&[0xFF], &[0x00]), Ordering::Greater);
}

#[test]
fn first_mismatch_decides() {
    assert_eq!(compare_bytes(&[1, 2, 3], &[1, 3, 0]), Ordering::Less);
    assert_eq!(compare_bytes(&[1, 9], &[1, 2, 3, 4]), Ordering::Greater);
}

#[test]
fn strict_prefix_is_less() {
    assert_eq!(compare_bytes(&[1, 2], &[1, 2, 0]), Ordering::Less);
    assert_eq!(compare_bytes(&[1, 2, 0], &[1, 2]), Ordering::Greater);
}

#[test]
fn equal_payloads() {
    assert_eq!(compare_bytes(b"abc", b"abc"), Ordering::Equal);
}

proptest! {
    #[test]
    fn antisymmetric(a in prop::collection::vec(any::<u8>(), 0..32),
                     b in prop::collection::vec(any::<u8>(), 0..32)) {
        prop_assert_eq!(compare_bytes(&a, &b), compare_bytes(&b, &a).reverse());
    }

    #[test]
    fn agrees_with_slice_ordering(a in prop::collection::vec(any::<u8>(), 0..32),
                                  b in prop::collection::vec(any::<u8>(), 0..32)) {
        prop_assert_eq!(compare_bytes(&a, &b), a.as_slice().cmp(b.as_slice()));
    }

    #[test]
    fn reflexive(a in prop::collection::vec(any::<u8>(), 0..32)) {
        prop_assert_eq!(compare_data(Some(&a), Some(&a)), Ordering::Equal);
    }
}
