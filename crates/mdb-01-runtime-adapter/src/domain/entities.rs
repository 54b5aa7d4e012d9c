//! # Domain Entities
//!
//! Values passed between the adapter service and the runtime port.

use serde::{Deserialize, Serialize};
use shared_types::{ContainerState, PortMapping, RestartPolicy, VolumeMount};
use std::collections::HashMap;

/// Bridge network the adapter attaches containers to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Network id or name.
    pub id: String,
    /// IPv4 subnet in CIDR form.
    pub subnet: String,
    /// Gateway address inside `subnet`.
    pub gateway: String,
}

impl NetworkSpec {
    pub fn new(
        id: impl Into<String>,
        subnet: impl Into<String>,
        gateway: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subnet: subnet.into(),
            gateway: gateway.into(),
        }
    }
}

/// Result of looking a container up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerLookup {
    Running { id: String },
    Stopped { id: String },
    NotFound,
}

impl ContainerLookup {
    /// `(running, id)` view. The id is empty when not found.
    pub fn as_pair(&self) -> (bool, &str) {
        match self {
            ContainerLookup::Running { id } => (true, id),
            ContainerLookup::Stopped { id } => (false, id),
            ContainerLookup::NotFound => (false, ""),
        }
    }

    /// Container id, if the container exists.
    pub fn id(&self) -> Option<&str> {
        match self {
            ContainerLookup::Running { id } | ContainerLookup::Stopped { id } => Some(id),
            ContainerLookup::NotFound => None,
        }
    }

    pub fn state(&self) -> ContainerState {
        match self {
            ContainerLookup::Running { .. } => ContainerState::Running,
            ContainerLookup::Stopped { .. } => ContainerState::Stopped,
            ContainerLookup::NotFound => ContainerState::NotFound,
        }
    }
}

/// Container reported by a runtime listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    /// Primary name without the runtime's leading `/`.
    pub name: String,
}

/// Everything the runtime needs to create one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContainerSpec {
    pub name: String,
    pub image: String,
    pub user: String,
    pub hostname: String,
    pub working_dir: String,
    pub environment: Vec<String>,
    pub commands: Vec<String>,
    pub ports: Vec<PortMapping>,
    pub volumes: Vec<VolumeMount>,
    pub restart_policy: RestartPolicy,
    /// Network to attach to.
    pub network_id: String,
    /// Optional fixed IPv4 address on `network_id`.
    pub ip_address: Option<String>,
    /// DNS aliases on `network_id`.
    pub aliases: Vec<String>,
}

/// Created container as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContainer {
    pub id: String,
    pub warnings: Vec<String>,
}

/// Container that was created and started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedContainer {
    pub id: String,
    pub warnings: Vec<String>,
}

/// Outcome of stopping a container by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    pub container_id: String,
    /// False when the container was already stopped.
    pub was_running: bool,
}

/// Filter applied to the runtime event subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Resource types, e.g. `container`.
    pub types: Vec<String>,
    /// Event actions, e.g. `start`.
    pub actions: Vec<String>,
}

impl EventFilter {
    /// Container create/start/die events.
    pub fn container_lifecycle() -> Self {
        Self {
            types: vec!["container".to_string()],
            actions: vec!["create".to_string(), "start".to_string(), "die".to_string()],
        }
    }

    /// Whether a raw event passes this filter.
    pub fn matches(&self, event: &RawEvent) -> bool {
        self.types.iter().any(|t| *t == event.kind) && self.actions.iter().any(|a| *a == event.action)
    }
}

/// Event as read from the runtime feed, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEvent {
    /// Resource type, e.g. `container`.
    pub kind: String,
    pub action: String,
    pub actor_id: Option<String>,
    pub attributes: HashMap<String, String>,
}
