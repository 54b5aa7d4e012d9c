//! # Runtime Adapter Configuration

use crate::domain::{NetworkSpec, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Working directory every started container gets.
pub const DEFAULT_WORKING_DIR: &str = "/app";

/// Runtime adapter configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeAdapterConfig {
    /// Network new containers are attached to.
    pub network: NetworkSpec,

    /// Working directory set on every container.
    pub working_dir: String,

    /// Pull the (already present) image before each create.
    pub refresh_images_before_start: bool,

    /// Event subscription behavior.
    pub events: EventStreamConfig,
}

impl Default for RuntimeAdapterConfig {
    fn default() -> Self {
        Self {
            network: NetworkSpec::default(),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            refresh_images_before_start: false,
            events: EventStreamConfig::default(),
        }
    }
}

impl RuntimeAdapterConfig {
    /// Create a config for testing (fixed network, fast backoff).
    pub fn for_testing() -> Self {
        Self {
            network: NetworkSpec::new("mdb-test-net", "172.30.0.0/16", "172.30.0.1"),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            refresh_images_before_start: false,
            events: EventStreamConfig {
                resubscribe: true,
                initial_backoff_ms: 10,
                max_backoff_ms: 40,
            },
        }
    }
}

/// Event subscription configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventStreamConfig {
    /// Resubscribe with backoff when the feed fails or ends.
    pub resubscribe: bool,

    /// First delay after a fault.
    pub initial_backoff_ms: u64,

    /// Delay cap.
    pub max_backoff_ms: u64,
}

impl Default for EventStreamConfig {
    fn default() -> Self {
        Self {
            resubscribe: true,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF.as_millis() as u64,
            max_backoff_ms: DEFAULT_MAX_BACKOFF.as_millis() as u64,
        }
    }
}

impl EventStreamConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}
