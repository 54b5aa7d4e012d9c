//! # Command Payloads
//!
//! Typed `params` and `result` bodies for every bus method.
//!
//! Parameters are decoded in one `serde_json::from_value` step. Every check
//! (shape, field types, pair syntax, restart policy names, non-empty names)
//! runs inside that decode, so a handler sees either a valid value or a
//! single decode error.

use crate::entities::*;
use serde::{Deserialize, Deserializer, Serialize};

/// Reject empty strings for required name fields.
fn non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        return Err(serde::de::Error::custom("must not be empty"));
    }
    Ok(value)
}

// =============================================================================
// start_docker
// =============================================================================

/// Parameters of `start_docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartContainerParams {
    /// Image to run. Must already be present on the host.
    #[serde(deserialize_with = "non_empty")]
    pub image_name: String,
    /// Unique container name, also used as hostname and network alias.
    #[serde(deserialize_with = "non_empty")]
    pub container_name: String,
    /// Restart policy. `restart` is accepted as a legacy key.
    #[serde(default, alias = "restart")]
    pub restart_policy: RestartPolicy,
    /// User the container process runs as. Empty means image default.
    #[serde(default)]
    pub user: String,
    /// Fixed IPv4 address on the bridge network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// `KEY=value` entries.
    #[serde(default)]
    pub environment: Vec<String>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default)]
    pub volumes: Vec<VolumeMount>,
    /// Command line overriding the image's default.
    #[serde(default)]
    pub commands: Vec<String>,
}

impl StartContainerParams {
    /// Minimal parameters for `image_name` under `container_name`.
    pub fn new(image_name: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            container_name: container_name.into(),
            restart_policy: RestartPolicy::default(),
            user: String::new(),
            ip_address: None,
            environment: Vec::new(),
            ports: Vec::new(),
            volumes: Vec::new(),
            commands: Vec::new(),
        }
    }
}

/// Result of `start_docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartContainerResult {
    pub container_id: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// =============================================================================
// inspect_docker / stop_docker
// =============================================================================

/// Parameters of `inspect_docker` and `stop_docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerNameParams {
    #[serde(deserialize_with = "non_empty")]
    pub container_name: String,
}

/// Result of `inspect_docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectContainerResult {
    pub container_name: String,
    /// Absent when the container does not exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    pub state: ContainerState,
}

/// Result of `stop_docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopContainerResult {
    pub container_name: String,
    pub container_id: String,
    /// False when the container was already stopped.
    pub was_running: bool,
}

// =============================================================================
// Notifications
// =============================================================================

/// `result` body of a `docker_event_*` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotificationResult {
    pub container_id: String,
    pub name: String,
    pub image: String,
    pub status: LifecycleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
}

impl From<&LifecycleEvent> for EventNotificationResult {
    fn from(event: &LifecycleEvent) -> Self {
        Self {
            container_id: event.container_id.clone(),
            name: event.container_name.clone(),
            image: event.image_name.clone(),
            status: event.status,
            exit_code: event.exit_code,
        }
    }
}
