//! # Runtime Adapter
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! Wraps the container runtime and presents it as idempotent, name-keyed
//! operations:
//!
//! | Operation | Failure policy |
//! |-----------|----------------|
//! | `ensure_network` | propagates create errors, lookup errors mean "create" |
//! | `image_exists` | listing errors read as `false` |
//! | `lookup_container` | listing errors read as "not present in that pass" |
//! | `create_and_start` | propagates, no rollback after create |
//! | `stop_container` | propagates, missing container is `ContainerNotFound` |
//! | `pull_image` | best-effort, callers discard the error |
//! | `stream_events` | resubscribes with backoff until the sink is gone |
//!
//! ## Module Structure
//!
//! ```text
//! mdb-01-runtime-adapter/
//! ├── domain/          # Entities, errors, event normalization, subscription FSM
//! ├── ports/           # RuntimeApi (inbound) + ContainerRuntime (outbound)
//! ├── adapters/        # Docker (bollard) and in-memory runtimes
//! ├── service.rs       # RuntimeAdapter
//! └── config.rs        # RuntimeAdapterConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::{EventStreamConfig, RuntimeAdapterConfig, DEFAULT_WORKING_DIR};
pub use domain::{
    normalize_event, Backoff, ContainerLookup, ContainerSummary, CreateContainerSpec,
    CreatedContainer, EventFilter, NetworkSpec, RawEvent, RuntimeError, StartedContainer,
    StopOutcome, SubscriptionSignal, SubscriptionState,
};
pub use ports::{ContainerRuntime, EventFeed, RuntimeApi};
pub use service::RuntimeAdapter;

#[cfg(feature = "docker")]
pub use adapters::DockerRuntime;
