//! # Command Loop
//!
//! Mutating commands (start, stop) run one at a time on a serial lane in
//! the order they arrived. Everything else is handled on its own task, so
//! an inspect never waits behind a start. Every message produces exactly
//! one response on the publish topic.

use bridge_telemetry::log_event;
use mdb_02_command_dispatch::{method_info, CommandDispatcher};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::adapters::{InboundMessage, QoS, Transport};

const COMPONENT: &str = "command_loop";

pub struct CommandLoop {
    dispatcher: Arc<CommandDispatcher>,
    transport: Arc<dyn Transport>,
    publish_topic: String,
}

impl CommandLoop {
    pub fn new(
        dispatcher: Arc<CommandDispatcher>,
        transport: Arc<dyn Transport>,
        publish_topic: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            transport,
            publish_topic: publish_topic.into(),
        }
    }

    /// Run until the inbound channel closes.
    pub async fn run(self, mut inbound: mpsc::Receiver<InboundMessage>) {
        let this = Arc::new(self);
        log_event!(info, COMPONENT, "Command loop started", topic = %this.publish_topic);

        let (serial_tx, mut serial_rx) = mpsc::unbounded_channel::<InboundMessage>();
        let serial = {
            let this = Arc::clone(&this);
            tokio::spawn(async move {
                while let Some(message) = serial_rx.recv().await {
                    this.handle(message).await;
                }
            })
        };

        while let Some(message) = inbound.recv().await {
            if is_mutating(&message.payload) {
                if serial_tx.send(message).is_err() {
                    log_event!(error, COMPONENT, "Serial command lane stopped");
                    break;
                }
            } else {
                let this = Arc::clone(&this);
                tokio::spawn(async move { this.handle(message).await });
            }
        }

        drop(serial_tx);
        if let Err(e) = serial.await {
            log_event!(error, COMPONENT, "Serial command lane failed", error = %e);
        }
        log_event!(info, COMPONENT, "Inbound channel closed, command loop stopped");
    }

    async fn handle(&self, message: InboundMessage) {
        debug!(topic = %message.topic, bytes = message.payload.len(), "Handling command");
        let response = self.dispatcher.handle_payload(&message.payload).await;
        let payload = match response.to_bytes() {
            Ok(payload) => payload,
            Err(e) => {
                error!(request_id = ?response.id, error = %e, "Failed to encode response");
                return;
            }
        };
        if let Err(e) = self
            .transport
            .publish(&self.publish_topic, payload, QoS::ExactlyOnce)
            .await
        {
            warn!(request_id = ?response.id, error = %e, "Failed to publish response");
        }
    }
}

/// Whether the payload names a method that changes container state.
fn is_mutating(payload: &[u8]) -> bool {
    serde_json::from_slice::<Value>(payload)
        .ok()
        .as_ref()
        .and_then(|value| value.get("method"))
        .and_then(Value::as_str)
        .and_then(method_info)
        .map_or(false, |info| info.mutates)
}
