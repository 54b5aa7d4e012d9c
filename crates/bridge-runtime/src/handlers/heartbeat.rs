//! # Heartbeat
//!
//! Publishes the host identity document on a fixed period. The first beat
//! goes out one period after start.

use bridge_telemetry::log_event;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::adapters::{QoS, Transport};

pub async fn run_heartbeat(
    payload: Vec<u8>,
    transport: Arc<dyn Transport>,
    publish_topic: String,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match transport
            .publish(&publish_topic, payload.clone(), QoS::ExactlyOnce)
            .await
        {
            Ok(()) => log_event!(debug, "heartbeat", "Heartbeat published", topic = %publish_topic),
            Err(e) => log_event!(
                warn,
                "heartbeat",
                "Heartbeat publish failed",
                topic = %publish_topic,
                error = %e
            ),
        }
    }
}
