//! Deterministic payload ordering.
//!
//! When two last-writer-wins messages carry the same timestamp, every peer
//! must pick the same winner. The winner is the payload that is greater under
//! this ordering, so the direction here must never change.

use std::cmp::Ordering;

/// Compares two optional payloads.
///
/// - `None` equals `None` and is less than any present payload.
/// - An empty payload is less than a non-empty one.
/// - Otherwise bytes are compared pairwise by unsigned value; the first
///   mismatch decides and a strict prefix is less.
#[must_use]
pub fn compare_data(a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_bytes(a, b),
    }
}

/// Compares two present payloads. See [`compare_data`].
#[must_use]
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }

    a.len().cmp(&b.len())
}
