//! # Adapters
//!
//! Port definitions and implementations for the outer surfaces.

pub mod host_info;
pub mod mqtt;
pub mod ports;

pub use host_info::{HostInfo, HostInfoError};
pub use mqtt::{MqttConnectOptions, MqttTransport};
pub use ports::{InboundMessage, QoS, Transport, TransportError};
