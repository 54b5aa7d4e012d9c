//! # MQTT-Docker Bridge
//!
//! Executes JSON-RPC container commands received over MQTT against the local
//! Docker engine and streams container lifecycle events back out.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bridge_runtime::{
    BridgeConfig, BridgeTasks, BridgeWiring, HostInfo, MqttConnectOptions, MqttTransport,
};
use bridge_telemetry::{init_telemetry, TelemetryConfig};
use mdb_01_runtime_adapter::{DockerRuntime, RuntimeAdapter};
use mdb_02_command_dispatch::{CommandDispatcher, LifecycleLock};

#[derive(Debug, Parser)]
#[command(name = "mqtt-docker-bridge", version, about)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = BridgeConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let host_info = HostInfo::load(&config.host_info_path).with_context(|| {
        format!(
            "Failed to load host info from {}",
            config.host_info_path.display()
        )
    })?;
    let instance_id = host_info.instance_id().to_string();
    let subscribe_topic = config.subscribe_topic(&instance_id);
    let publish_topic = config.publish_topic(&instance_id);
    info!(
        instance_id = %instance_id,
        subscribe_topic = %subscribe_topic,
        publish_topic = %publish_topic,
        "Starting MQTT-Docker bridge"
    );

    let docker = DockerRuntime::connect().context("Failed to connect to Docker")?;
    let adapter = Arc::new(RuntimeAdapter::new(
        Arc::new(docker),
        config.runtime_adapter_config(),
    ));
    let network_id = adapter
        .ensure_configured_network()
        .await
        .context("Failed to create the docker network")?;
    info!(network_id = %network_id, "Docker network ready");

    let dispatcher = Arc::new(
        CommandDispatcher::with_default_handlers(adapter.clone(), LifecycleLock::new())
            .context("Failed to register command handlers")?,
    );

    let broker = config.broker_address()?;
    let (transport, inbound) = MqttTransport::connect(&MqttConnectOptions {
        host: broker.host,
        port: broker.port,
        client_id: config.client_id(&instance_id),
        username: config.mqtt.username.clone(),
        password: config.mqtt.password.clone(),
        subscribe_topic,
    });
    let transport = Arc::new(transport);

    let heartbeat = match config.heartbeat_interval() {
        Some(period) => Some((
            host_info
                .to_json_bytes()
                .context("Failed to encode host info")?,
            period,
        )),
        None => None,
    };

    let tasks = BridgeTasks::spawn(BridgeWiring {
        runtime: adapter,
        dispatcher,
        transport: transport.clone(),
        inbound,
        publish_topic,
        events: config.event_bridge_config(),
        heartbeat,
    });

    info!("Bridge is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Initiating shutdown...");
    tasks.abort_all();
    transport.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}
