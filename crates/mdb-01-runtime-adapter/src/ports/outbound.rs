//! # Outbound Ports
//!
//! The container runtime as seen by the adapter service. Implementations
//! are thin translations of runtime API calls. Idempotence, lookups by name
//! and the subscription loop live in the service.

use crate::domain::{
    ContainerSummary, CreateContainerSpec, CreatedContainer, EventFilter, NetworkSpec, RawEvent,
    RuntimeError,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Raw event feed returned by a subscription.
pub type EventFeed = BoxStream<'static, Result<RawEvent, RuntimeError>>;

/// Container runtime - outbound port.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Inspect a network by id or name, returning its id.
    async fn inspect_network(&self, id: &str) -> Result<String, RuntimeError>;

    /// Create a bridge network.
    async fn create_network(&self, spec: &NetworkSpec) -> Result<(), RuntimeError>;

    /// Repository tags of every local image.
    async fn list_image_tags(&self) -> Result<Vec<String>, RuntimeError>;

    /// Pull an image from its registry.
    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError>;

    /// List containers. `all == false` returns running containers only.
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, RuntimeError>;

    async fn create_container(
        &self,
        spec: &CreateContainerSpec,
    ) -> Result<CreatedContainer, RuntimeError>;

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError>;

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError>;

    /// Open an event subscription restricted to `filter`.
    async fn subscribe_events(&self, filter: &EventFilter) -> Result<EventFeed, RuntimeError>;
}
