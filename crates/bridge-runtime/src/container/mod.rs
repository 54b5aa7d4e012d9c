//! Runtime configuration.

pub mod config;

pub use config::{
    BridgeConfig, BrokerAddress, ConfigError, DockerSection, EventsSection, MqttSection,
    DEFAULT_HOST_INFO_PATH, DEFAULT_MQTT_PORT,
};
