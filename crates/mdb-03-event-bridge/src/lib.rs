//! # Event Bridge
//!
//! **Subsystem ID:** 3
//!
//! Consumes the runtime adapter's lifecycle event stream and republishes each
//! event as a `docker_event_<status>` notification on an outbound handoff
//! channel for the transport to forward. With the default rendezvous handoff
//! nothing is buffered, so ordering holds from the runtime feed to the bus.
//!
//! ## Module Structure
//!
//! ```text
//! mdb-03-event-bridge/
//! ├── domain/          # Status -> method table, notification builder
//! ├── service.rs       # EventBridge producer + forwarder tasks
//! └── config.rs        # EventBridgeConfig
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

pub use config::EventBridgeConfig;
pub use domain::{
    build_notification, notification_method, EVENT_CREATE, EVENT_DIE, EVENT_START,
};
pub use service::{EventBridge, EventBridgeHandle};
