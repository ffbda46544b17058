//! Identifier types used throughout the scene CRDT.
//!
//! Entity ids pack a 16-bit entity number and a 16-bit version into one
//! 32-bit value so recycled numbers can be told apart from their previous
//! incarnations.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NUMBER_MASK: u32 = 0xFFFF;
const VERSION_SHIFT: u32 = 16;

/// Identifier of a scene entity.
///
/// The low 16 bits hold the entity number, the high 16 bits hold its version.
/// Equality, ordering and hashing are over the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates an entity id from its raw 32-bit representation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Creates an entity id from a number and a version.
    #[must_use]
    pub const fn new(number: u16, version: u16) -> Self {
        Self(((version as u32) << VERSION_SHIFT) | number as u32)
    }

    /// Returns the raw 32-bit value.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Returns the entity number (low 16 bits).
    #[must_use]
    pub const fn number(&self) -> u16 {
        (self.0 & NUMBER_MASK) as u16
    }

    /// Returns the entity version (high 16 bits).
    #[must_use]
    pub const fn version(&self) -> u16 {
        (self.0 >> VERSION_SHIFT) as u16
    }

    /// Returns the id that reuses this number with the next version.
    #[must_use]
    pub const fn next_version(&self) -> Self {
        Self::new(self.number(), self.version().wrapping_add(1))
    }
}

impl From<u32> for EntityId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.number(), self.version())
    }
}

impl FromStr for EntityId {
    type Err = Error;

    /// Accepts either `number:version` or a bare raw value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidEntityId(s.to_string());

        match s.split_once(':') {
            Some((number, version)) => {
                let number = number.trim().parse::<u16>().map_err(|_| invalid())?;
                let version = version.trim().parse::<u16>().map_err(|_| invalid())?;
                Ok(Self::new(number, version))
            }
            None => s.trim().parse::<u32>().map(Self).map_err(|_| invalid()),
        }
    }
}

/// Identifier of a component type. The schema behind it is external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Creates a component id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ComponentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ComponentId> for u32 {
    fn from(id: ComponentId) -> Self {
        id.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
