//! # Event Bridge Service
//!
//! ```text
//! RuntimeApi::stream_events ──handoff──▶ forwarder ──handoff──▶ transport
//!        (producer task)      events     (notifications)        (caller)
//! ```
//!
//! When the outbound receiver is dropped the forwarder exits and drops the
//! internal receiver, which makes the producer's next send fail and ends it.

use mdb_01_runtime_adapter::{RuntimeApi, RuntimeError};
use shared_bus::{handoff_channel, HandoffReceiver, HandoffSender};
use shared_types::{LifecycleEvent, RpcResponse};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::EventBridgeConfig;
use crate::domain::build_notification;

/// Forwards runtime lifecycle events as outbound notifications.
pub struct EventBridge {
    runtime: Arc<dyn RuntimeApi>,
    config: EventBridgeConfig,
}

/// Running bridge tasks.
pub struct EventBridgeHandle {
    pub producer: JoinHandle<Result<(), RuntimeError>>,
    pub forwarder: JoinHandle<()>,
}

impl EventBridgeHandle {
    pub fn abort(&self) {
        self.producer.abort();
        self.forwarder.abort();
    }

    /// Wait for both tasks. Returns the producer's outcome.
    ///
    /// A panic in either task is returned as [`RuntimeError::TaskFailed`].
    /// A task cancelled through [`abort`](Self::abort) is not an error.
    pub async fn join(self) -> Result<(), RuntimeError> {
        let producer = self.producer.await;
        let forwarder = self.forwarder.await;
        let outcome = match producer {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                debug!("Event producer task cancelled");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Event producer task panicked");
                return Err(RuntimeError::TaskFailed(e.to_string()));
            }
        };
        match forwarder {
            Ok(()) => outcome,
            Err(e) if e.is_cancelled() => {
                debug!("Event forwarder task cancelled");
                outcome
            }
            Err(e) => {
                error!(error = %e, "Event forwarder task panicked");
                Err(RuntimeError::TaskFailed(e.to_string()))
            }
        }
    }
}

impl EventBridge {
    pub fn new(runtime: Arc<dyn RuntimeApi>, config: EventBridgeConfig) -> Self {
        Self { runtime, config }
    }

    /// Start the bridge. Notifications arrive on the returned receiver.
    pub fn start(&self) -> (EventBridgeHandle, HandoffReceiver<RpcResponse>) {
        let (outbound_tx, outbound_rx) = handoff_channel(self.config.handoff_capacity);
        (self.spawn(outbound_tx), outbound_rx)
    }

    /// Start the bridge publishing into an existing outbound channel.
    pub fn spawn(&self, outbound: HandoffSender<RpcResponse>) -> EventBridgeHandle {
        let (events_tx, events_rx) = handoff_channel(self.config.handoff_capacity);

        let runtime = Arc::clone(&self.runtime);
        let producer = tokio::spawn(async move {
            let outcome = runtime.stream_events(events_tx).await;
            match &outcome {
                Ok(()) => debug!("Event producer stopped"),
                Err(e) => warn!(error = %e, "Event producer ended with error"),
            }
            outcome
        });
        let forwarder = tokio::spawn(forward(events_rx, outbound));

        info!(
            handoff_capacity = self.config.handoff_capacity,
            "Event bridge started"
        );
        EventBridgeHandle {
            producer,
            forwarder,
        }
    }
}

async fn forward(
    mut events: HandoffReceiver<LifecycleEvent>,
    outbound: HandoffSender<RpcResponse>,
) {
    while let Some(event) = events.recv().await {
        let notification = match build_notification(&event) {
            Ok(notification) => notification,
            Err(e) => {
                warn!(container_id = %event.container_id, error = %e, "Dropping unencodable event");
                continue;
            }
        };
        debug!(
            container_id = %event.container_id,
            status = %event.status,
            "Forwarding container event"
        );
        if outbound.send(notification).await.is_err() {
            info!("Outbound notification consumer gone, stopping event forwarder");
            break;
        }
    }
}
