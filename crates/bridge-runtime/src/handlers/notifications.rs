//! # Notification Publisher
//!
//! Drains the event bridge's outbound handoff onto the publish topic. Taking
//! an item releases the bridge, so the publish pace sets the event pace.

use shared_bus::HandoffReceiver;
use shared_types::RpcResponse;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::{QoS, Transport};

pub async fn run_notification_publisher(
    mut notifications: HandoffReceiver<RpcResponse>,
    transport: Arc<dyn Transport>,
    publish_topic: String,
) {
    while let Some(notification) = notifications.recv().await {
        let payload = match notification.to_bytes() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(method = ?notification.method, error = %e, "Dropping unencodable notification");
                continue;
            }
        };
        match transport
            .publish(&publish_topic, payload, QoS::ExactlyOnce)
            .await
        {
            Ok(()) => debug!(method = ?notification.method, "Published container event"),
            Err(e) => {
                warn!(method = ?notification.method, error = %e, "Failed to publish container event")
            }
        }
    }
    info!("Notification stream ended");
}
