//! # Event Bridge Configuration

use serde::{Deserialize, Serialize};

/// Event bridge configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBridgeConfig {
    /// Slots in each handoff channel. Zero is rendezvous: nothing is buffered
    /// and a slow transport stalls the runtime subscription.
    pub handoff_capacity: usize,
}

impl EventBridgeConfig {
    pub fn bounded(capacity: usize) -> Self {
        Self {
            handoff_capacity: capacity,
        }
    }
}
