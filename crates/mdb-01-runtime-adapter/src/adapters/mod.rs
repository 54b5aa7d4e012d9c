//! # Adapters
//!
//! Concrete [`ContainerRuntime`](crate::ports::ContainerRuntime) implementations.

/// Docker Engine adapter.
/// Requires feature: `docker`
#[cfg(feature = "docker")]
pub mod docker;

/// In-memory runtime for tests.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

#[cfg(feature = "docker")]
pub use docker::DockerRuntime;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::{FailPoint, InMemoryRuntime, RuntimeCall};
