//! Engine configuration.

use crate::CrdtResult;
use scene_crdt_wire::MAX_MESSAGE_LENGTH;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::CrdtProtocol`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Maximum number of APPEND values kept per (entity, component).
    ///
    /// When an insert would exceed the cap, the retained values for that pair
    /// are cleared first. `None` keeps every value.
    pub append_capacity: Option<usize>,
    /// Largest frame accepted by [`crate::CrdtProtocol::process_buffer`].
    pub max_message_length: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            append_capacity: None,
            max_message_length: MAX_MESSAGE_LENGTH,
        }
    }
}

impl ProtocolConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CrdtResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
