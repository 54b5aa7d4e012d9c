//! # Task Wiring
//!
//! ```text
//!  transport pump ──inbound──▶ CommandLoop ──▶ CommandDispatcher ──▶ RuntimeApi
//!                                   │                                  │
//!                                   ▼                            stream_events
//!                            publish topic                             │
//!                              ▲       ▲                               ▼
//!  notification publisher ─────┘       │          ◀──handoff──  EventBridge
//!  heartbeat ──────────────────────────┘
//! ```

use mdb_01_runtime_adapter::RuntimeApi;
use mdb_02_command_dispatch::CommandDispatcher;
use mdb_03_event_bridge::{EventBridge, EventBridgeConfig, EventBridgeHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::adapters::{InboundMessage, Transport};
use crate::handlers::{run_heartbeat, run_notification_publisher, CommandLoop};

/// Inputs for [`BridgeTasks::spawn`].
pub struct BridgeWiring {
    pub runtime: Arc<dyn RuntimeApi>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub transport: Arc<dyn Transport>,
    pub inbound: mpsc::Receiver<InboundMessage>,
    pub publish_topic: String,
    pub events: EventBridgeConfig,
    /// `(payload, period)` when the heartbeat is enabled.
    pub heartbeat: Option<(Vec<u8>, Duration)>,
}

/// Handles of every spawned bridge task.
pub struct BridgeTasks {
    pub commands: JoinHandle<()>,
    pub events: EventBridgeHandle,
    pub notifications: JoinHandle<()>,
    pub heartbeat: Option<JoinHandle<()>>,
}

impl BridgeTasks {
    pub fn spawn(wiring: BridgeWiring) -> Self {
        let BridgeWiring {
            runtime,
            dispatcher,
            transport,
            inbound,
            publish_topic,
            events,
            heartbeat,
        } = wiring;

        let commands = tokio::spawn(
            CommandLoop::new(dispatcher, Arc::clone(&transport), publish_topic.clone())
                .run(inbound),
        );

        let (events, outbound) = EventBridge::new(runtime, events).start();
        let notifications = tokio::spawn(run_notification_publisher(
            outbound,
            Arc::clone(&transport),
            publish_topic.clone(),
        ));

        let heartbeat = heartbeat.map(|(payload, period)| {
            info!(period_secs = period.as_secs(), "Heartbeat enabled");
            tokio::spawn(run_heartbeat(payload, transport, publish_topic, period))
        });

        Self {
            commands,
            events,
            notifications,
            heartbeat,
        }
    }

    pub fn abort_all(&self) {
        self.commands.abort();
        self.events.abort();
        self.notifications.abort();
        if let Some(heartbeat) = &self.heartbeat {
            heartbeat.abort();
        }
    }
}
