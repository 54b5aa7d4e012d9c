//! # Transport Port
//!
//! Outbound publishing seam between the bridge tasks and the message bus.
//! Inbound messages arrive on an `mpsc::Receiver<InboundMessage>` fed by the
//! adapter.

use async_trait::async_trait;
use thiserror::Error;

/// Delivery guarantee for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    #[default]
    ExactlyOnce,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport client error: {0}")]
    Client(String),

    #[error("transport closed")]
    Closed,
}

/// One message received on the command topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Message bus publisher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: QoS)
        -> Result<(), TransportError>;
}
