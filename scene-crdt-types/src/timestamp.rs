//! Logical clock values carried by CRDT messages.
//!
//! Timestamps are Lamport-style counters, not wall-clock time. A single
//! writer increments the counter per (entity, component) pair; values from
//! different writers are only comparable for conflict resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical timestamp.
///
/// Ordered by its unsigned 32-bit value, which is what travels on the wire.
///
/// Peers that keep timestamps as signed 32-bit integers read values above
/// `i32::MAX` as negative and order them below small stamps. Writers that
/// share a scene with such peers must keep timestamps below 2^31, which is
/// [`Timestamp::SIGNED_INTEROP_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u32);

impl Timestamp {
    /// The first timestamp a writer assigns to a fresh slot.
    pub const ZERO: Self = Self(0);

    /// First value that signed 32-bit peers read as negative.
    pub const SIGNED_INTEROP_LIMIT: Self = Self(1 << 31);

    /// Creates a timestamp from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Whether signed 32-bit peers order this stamp the same way.
    #[must_use]
    pub const fn is_signed_safe(&self) -> bool {
        self.0 < Self::SIGNED_INTEROP_LIMIT.0
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns the next timestamp for a local write.
    ///
    /// Saturates at `u32::MAX`: past that point new writes tie with the
    /// stored value and fall back to the payload tie-break.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u32> for Timestamp {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for u32 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
