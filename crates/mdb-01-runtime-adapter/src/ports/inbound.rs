//! # Inbound Ports
//!
//! API exposed by the runtime adapter to the command dispatcher, the event
//! bridge and the binary.

use crate::domain::{ContainerLookup, NetworkSpec, RuntimeError, StartedContainer, StopOutcome};
use async_trait::async_trait;
use shared_bus::HandoffSender;
use shared_types::{LifecycleEvent, StartContainerParams};

/// Runtime adapter API - inbound port.
#[async_trait]
pub trait RuntimeApi: Send + Sync {
    /// Make sure the bridge network exists and return its id.
    ///
    /// An existing network is reused. Lookup failures are treated as absence.
    async fn ensure_network(&self, network: &NetworkSpec) -> Result<String, RuntimeError>;

    /// Whether any local image tag starts with `image_name`.
    ///
    /// Listing errors are logged and read as `false`.
    async fn image_exists(&self, image_name: &str) -> bool;

    /// Find a container by name, preferring running containers.
    ///
    /// Listing errors are logged and read as "not present in that pass".
    async fn lookup_container(&self, name: &str) -> ContainerLookup;

    /// Create the container on the configured network and start it.
    async fn create_and_start(
        &self,
        request: &StartContainerParams,
    ) -> Result<StartedContainer, RuntimeError>;

    /// Stop a container by name.
    async fn stop_container(&self, name: &str) -> Result<StopOutcome, RuntimeError>;

    /// Best-effort image pull. Callers log and discard the error.
    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError>;

    /// Push normalized lifecycle events onto `sink` until its receiver is gone.
    async fn stream_events(&self, sink: HandoffSender<LifecycleEvent>) -> Result<(), RuntimeError>;
}
