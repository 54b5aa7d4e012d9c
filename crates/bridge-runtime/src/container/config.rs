//! # Bridge Configuration
//!
//! YAML configuration for the whole bridge. Every section has defaults, so a
//! file only needs the values that differ.
//!
//! ```yaml
//! app_name: edge-agent
//! docker:
//!   network_id: mdb-net
//!   network_subnet: 172.30.0.0/16
//!   network_gateway: 172.30.0.1
//! mqtt:
//!   broker: tcp://broker.local:1883
//!   username: user
//!   password: secret
//! host_info_path: /etc/linux-hostinfo/hostinfo.yaml
//! ```

use mdb_01_runtime_adapter::{
    EventStreamConfig, NetworkSpec, RuntimeAdapterConfig, DEFAULT_WORKING_DIR,
};
use mdb_03_event_bridge::EventBridgeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Port used when the broker address does not name one.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default host identity document.
pub const DEFAULT_HOST_INFO_PATH: &str = "/etc/linux-hostinfo/hostinfo.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid broker address '{address}': {reason}")]
    InvalidBroker { address: String, reason: String },
}

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix of both bus topics.
    pub app_name: String,
    /// Docker settings.
    pub docker: DockerSection,
    /// Broker settings.
    pub mqtt: MqttSection,
    /// Event stream settings.
    pub events: EventsSection,
    /// Host identity document.
    pub host_info_path: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_name: "mqtt-docker-bridge".to_string(),
            docker: DockerSection::default(),
            mqtt: MqttSection::default(),
            events: EventsSection::default(),
            host_info_path: PathBuf::from(DEFAULT_HOST_INFO_PATH),
        }
    }
}

/// Docker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSection {
    pub network_id: String,
    pub network_subnet: String,
    pub network_gateway: String,
    /// Working directory of every started container.
    pub working_dir: String,
    /// Pull the image before each create.
    pub refresh_images_before_start: bool,
}

impl Default for DockerSection {
    fn default() -> Self {
        Self {
            network_id: String::new(),
            network_subnet: String::new(),
            network_gateway: String::new(),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            refresh_images_before_start: false,
        }
    }
}

/// MQTT configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSection {
    /// `tcp://host:port`, `mqtt://host:port` or `host[:port]`.
    pub broker: String,
    /// Empty means the instance id.
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub enable_heartbeat: bool,
    /// Seconds between heartbeats.
    pub heartbeat_interval: u64,
    /// Empty means `{app_name}/cmd/{instance_id}`.
    pub broker_publish_topic: String,
    /// Empty means `{app_name}/{instance_id}`.
    pub broker_subscribe_topic: String,
}

impl Default for MqttSection {
    fn default() -> Self {
        Self {
            broker: String::new(),
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
            enable_heartbeat: true,
            heartbeat_interval: 30,
            broker_publish_topic: String::new(),
            broker_subscribe_topic: String::new(),
        }
    }
}

/// Event subscription and handoff configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSection {
    pub resubscribe: bool,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// 0 is rendezvous.
    pub handoff_capacity: usize,
}

impl Default for EventsSection {
    fn default() -> Self {
        let stream = EventStreamConfig::default();
        Self {
            resubscribe: stream.resubscribe,
            initial_backoff_ms: stream.initial_backoff_ms,
            max_backoff_ms: stream.max_backoff_ms,
            handoff_capacity: EventBridgeConfig::default().handoff_capacity,
        }
    }
}

/// Broker host and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl BridgeConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker.trim().is_empty() {
            return Err(ConfigError::Invalid("mqtt.broker must be set".into()));
        }
        if self.docker.network_id.trim().is_empty() {
            return Err(ConfigError::Invalid("docker.network_id must be set".into()));
        }
        if self.mqtt.enable_heartbeat && self.mqtt.heartbeat_interval == 0 {
            return Err(ConfigError::Invalid(
                "mqtt.heartbeat_interval must be positive when the heartbeat is enabled".into(),
            ));
        }
        if self.events.initial_backoff_ms == 0 {
            return Err(ConfigError::Invalid(
                "events.initial_backoff_ms must be positive".into(),
            ));
        }
        if self.events.initial_backoff_ms > self.events.max_backoff_ms {
            return Err(ConfigError::Invalid(format!(
                "events.initial_backoff_ms ({}) exceeds events.max_backoff_ms ({})",
                self.events.initial_backoff_ms, self.events.max_backoff_ms
            )));
        }
        self.broker_address()?;
        Ok(())
    }

    /// Topic commands arrive on.
    pub fn subscribe_topic(&self, instance_id: &str) -> String {
        if self.mqtt.broker_subscribe_topic.is_empty() {
            format!("{}/{}", self.app_name, instance_id)
        } else {
            self.mqtt.broker_subscribe_topic.clone()
        }
    }

    /// Topic responses, notifications and heartbeats go to.
    pub fn publish_topic(&self, instance_id: &str) -> String {
        if self.mqtt.broker_publish_topic.is_empty() {
            format!("{}/cmd/{}", self.app_name, instance_id)
        } else {
            self.mqtt.broker_publish_topic.clone()
        }
    }

    pub fn client_id(&self, instance_id: &str) -> String {
        if self.mqtt.client_id.is_empty() {
            instance_id.to_string()
        } else {
            self.mqtt.client_id.clone()
        }
    }

    /// Parse `mqtt.broker`.
    pub fn broker_address(&self) -> Result<BrokerAddress, ConfigError> {
        parse_broker(&self.mqtt.broker)
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.mqtt
            .enable_heartbeat
            .then(|| Duration::from_secs(self.mqtt.heartbeat_interval))
    }

    pub fn network_spec(&self) -> NetworkSpec {
        NetworkSpec::new(
            &self.docker.network_id,
            &self.docker.network_subnet,
            &self.docker.network_gateway,
        )
    }

    pub fn runtime_adapter_config(&self) -> RuntimeAdapterConfig {
        RuntimeAdapterConfig {
            network: self.network_spec(),
            working_dir: self.docker.working_dir.clone(),
            refresh_images_before_start: self.docker.refresh_images_before_start,
            events: EventStreamConfig {
                resubscribe: self.events.resubscribe,
                initial_backoff_ms: self.events.initial_backoff_ms,
                max_backoff_ms: self.events.max_backoff_ms,
            },
        }
    }

    pub fn event_bridge_config(&self) -> EventBridgeConfig {
        EventBridgeConfig::bounded(self.events.handoff_capacity)
    }
}

fn parse_broker(address: &str) -> Result<BrokerAddress, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBroker {
        address: address.to_string(),
        reason,
    };

    let address = address.trim();
    let url = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("tcp://{}", address))
    }
    .map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "tcp" | "mqtt" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host".to_string()))?;

    Ok(BrokerAddress {
        host: host.to_string(),
        port: url.port().unwrap_or(DEFAULT_MQTT_PORT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
app_name: edge-agent
docker:
  network_id: mdb-net
  network_subnet: 172.30.0.0/16
  network_gateway: 172.30.0.1
  refresh_images_before_start: true
mqtt:
  broker: tcp://broker.local:1884
  username: user
  password: secret
  heartbeat_interval: 10
events:
  resubscribe: false
  initial_backoff_ms: 100
  max_backoff_ms: 1000
  handoff_capacity: 8
host_info_path: /tmp/hostinfo.yaml
"#;

    fn minimal() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.mqtt.broker = "broker.local".into();
        config.docker.network_id = "mdb-net".into();
        config
    }

    #[test]
    fn test_full_file_parses() {
        let config = BridgeConfig::from_yaml_str(FULL).unwrap();
        assert_eq!(config.app_name, "edge-agent");
        assert_eq!(config.docker.working_dir, "/app");
        assert_eq!(config.mqtt.heartbeat_interval, 10);
        assert!(config.mqtt.enable_heartbeat);
        assert_eq!(config.host_info_path, PathBuf::from("/tmp/hostinfo.yaml"));

        let adapter = config.runtime_adapter_config();
        assert_eq!(adapter.network.id, "mdb-net");
        assert_eq!(adapter.network.gateway, "172.30.0.1");
        assert!(adapter.refresh_images_before_start);
        assert!(!adapter.events.resubscribe);
        assert_eq!(adapter.events.max_backoff_ms, 1000);
        assert_eq!(config.event_bridge_config().handoff_capacity, 8);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.docker.network_subnet, "172.30.0.0/16");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        match BridgeConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_failures() {
        let mut config = minimal();
        config.mqtt.broker.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = minimal();
        config.docker.network_id = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = minimal();
        config.mqtt.heartbeat_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.mqtt.enable_heartbeat = false;
        assert!(config.validate().is_ok());

        let mut config = minimal();
        config.events.initial_backoff_ms = 5_000;
        config.events.max_backoff_ms = 1_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = minimal();
        config.events.initial_backoff_ms = 0;
        match config.validate() {
            Err(ConfigError::Invalid(message)) => assert!(message.contains("initial_backoff_ms")),
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_derived_topics() {
        let config = minimal();
        assert_eq!(config.subscribe_topic("i-42"), "mqtt-docker-bridge/i-42");
        assert_eq!(config.publish_topic("i-42"), "mqtt-docker-bridge/cmd/i-42");
        assert_eq!(config.client_id("i-42"), "i-42");
    }

    #[test]
    fn test_topic_overrides() {
        let mut config = minimal();
        config.mqtt.broker_subscribe_topic = "in/custom".into();
        config.mqtt.broker_publish_topic = "out/custom".into();
        config.mqtt.client_id = "bridge-a".into();
        assert_eq!(config.subscribe_topic("i-42"), "in/custom");
        assert_eq!(config.publish_topic("i-42"), "out/custom");
        assert_eq!(config.client_id("i-42"), "bridge-a");
    }

    #[test]
    fn test_broker_forms() {
        let cases = [
            ("tcp://broker.local:1884", "broker.local", 1884),
            ("mqtt://10.0.0.5", "10.0.0.5", 1883),
            ("broker.local:2000", "broker.local", 2000),
            ("broker.local", "broker.local", 1883),
        ];
        for (raw, host, port) in cases {
            let address = parse_broker(raw).unwrap();
            assert_eq!(address.host, host, "{}", raw);
            assert_eq!(address.port, port, "{}", raw);
        }
    }

    #[test]
    fn test_broker_rejects_other_schemes() {
        assert!(matches!(
            parse_broker("http://broker.local"),
            Err(ConfigError::InvalidBroker { .. })
        ));
        assert!(parse_broker("tcp://").is_err());
    }

    #[test]
    fn test_heartbeat_interval() {
        let mut config = minimal();
        assert_eq!(config.heartbeat_interval(), Some(Duration::from_secs(30)));
        config.mqtt.enable_heartbeat = false;
        assert_eq!(config.heartbeat_interval(), None);
    }
}
