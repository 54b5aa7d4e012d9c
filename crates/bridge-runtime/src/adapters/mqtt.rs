//! # MQTT Transport
//!
//! `rumqttc` client plus an event-loop pump task.
//!
//! The pump subscribes to the command topic on every `ConnAck`, so the
//! subscription survives broker reconnects. The subscribe request is queued
//! from a separate task because only the pump drains the request queue.
//! Connection errors are logged and polling resumes after [`RECONNECT_DELAY`].

use async_trait::async_trait;
use rumqttc::{AsyncClient, ClientError, Event, EventLoop, MqttOptions, Packet};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ports::{InboundMessage, QoS, Transport, TransportError};

pub const KEEP_ALIVE: Duration = Duration::from_secs(30);
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Requests buffered between the client handle and the event loop.
const CLIENT_CAPACITY: usize = 64;

/// Inbound messages buffered between the pump and the command loop.
const INBOUND_CAPACITY: usize = 64;

/// Everything needed to open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConnectOptions {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub subscribe_topic: String,
}

impl MqttConnectOptions {
    fn to_mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(KEEP_ALIVE);
        if !self.username.is_empty() {
            options.set_credentials(&self.username, &self.password);
        }
        options
    }
}

impl From<QoS> for rumqttc::QoS {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

impl From<ClientError> for TransportError {
    fn from(e: ClientError) -> Self {
        match e {
            // An awaited request only fails once the event loop is dropped.
            ClientError::Request(_) => TransportError::Closed,
            ClientError::TryRequest(_) => TransportError::Client(e.to_string()),
        }
    }
}

/// MQTT-backed [`Transport`].
pub struct MqttTransport {
    client: AsyncClient,
    pump: JoinHandle<()>,
}

impl MqttTransport {
    /// Create the client and start the pump.
    ///
    /// Returns immediately. The broker connection is established by the pump
    /// and retried until it succeeds.
    pub fn connect(options: &MqttConnectOptions) -> (Self, mpsc::Receiver<InboundMessage>) {
        let (client, eventloop) = AsyncClient::new(options.to_mqtt_options(), CLIENT_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

        info!(
            host = %options.host,
            port = options.port,
            client_id = %options.client_id,
            topic = %options.subscribe_topic,
            "Connecting to MQTT broker"
        );
        let pump = tokio::spawn(pump(
            eventloop,
            client.clone(),
            options.subscribe_topic.clone(),
            inbound_tx,
        ));

        (Self { client, pump }, inbound_rx)
    }

    /// Disconnect and stop the pump.
    pub async fn shutdown(&self) {
        if let Err(e) = self.client.disconnect().await {
            debug!(error = %e, "MQTT disconnect failed");
        }
        self.pump.abort();
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
    ) -> Result<(), TransportError> {
        self.client
            .publish(topic, qos.into(), false, payload)
            .await
            .map_err(TransportError::from)
    }
}

async fn pump(
    mut eventloop: EventLoop,
    client: AsyncClient,
    topic: String,
    inbound: mpsc::Sender<InboundMessage>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!(code = ?ack.code, "MQTT connected");
                let client = client.clone();
                let topic = topic.clone();
                tokio::spawn(async move {
                    let attempt = || {
                        let client = client.clone();
                        let topic = topic.clone();
                        async move {
                            client
                                .subscribe(topic, rumqttc::QoS::ExactlyOnce)
                                .await
                                .map_err(TransportError::from)
                        }
                    };
                    subscribe_until_queued(&topic, attempt, RECONNECT_DELAY).await;
                });
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(topic = %publish.topic, bytes = publish.payload.len(), "MQTT message received");
                let message = InboundMessage {
                    topic: publish.topic.clone(),
                    payload: publish.payload.to_vec(),
                };
                if inbound.send(message).await.is_err() {
                    info!("Inbound consumer gone, stopping MQTT pump");
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "MQTT connection error, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Retry `attempt` until the subscribe request is queued.
///
/// Returns false once the transport reports it is closed.
async fn subscribe_until_queued<F, Fut>(topic: &str, mut attempt: F, delay: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), TransportError>>,
{
    loop {
        match attempt().await {
            Ok(()) => {
                info!(topic = %topic, "Subscribed to command topic");
                return true;
            }
            Err(TransportError::Closed) => {
                warn!(topic = %topic, "Transport closed before command topic subscribe");
                return false;
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "Command topic subscribe failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
