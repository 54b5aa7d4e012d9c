//! # Bridge Runtime Library
//!
//! Exposes the runtime's modules for testing. The entry point is the
//! `mqtt-docker-bridge` binary.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line and install telemetry
//! 2. Load and validate the YAML config
//! 3. Load the host identity document
//! 4. Connect Docker and ensure the bridge network exists (fatal on failure)
//! 5. Build the command dispatcher with the default handlers
//! 6. Connect the MQTT transport
//! 7. Spawn the command loop, event bridge, notification publisher and
//!    heartbeat
//! 8. Wait for Ctrl-C, then abort every task

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod wiring;

pub use adapters::{
    HostInfo, HostInfoError, InboundMessage, MqttConnectOptions, MqttTransport, QoS, Transport,
    TransportError,
};
pub use container::{BridgeConfig, ConfigError};
pub use wiring::{BridgeTasks, BridgeWiring};
