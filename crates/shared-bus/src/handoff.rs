//! # Handoff Channel
//!
//! Single-producer/single-consumer style queue with two modes:
//!
//! - **Rendezvous** (`capacity == 0`): `send` resolves only once the receiver
//!   has taken the item. Nothing is buffered, so a slow consumer stalls the
//!   producer.
//! - **Bounded** (`capacity > 0`): up to `capacity` items are buffered before
//!   `send` waits.
//!
//! Both modes deliver in FIFO order. Senders may be cloned.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// Errors from handoff operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HandoffError {
    /// The other side of the channel was dropped.
    #[error("handoff channel closed")]
    Closed,
}

/// Delivery mode of a handoff channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffMode {
    Rendezvous,
    Bounded(usize),
}

impl HandoffMode {
    /// Mode for a configured capacity. Zero selects rendezvous.
    #[must_use]
    pub fn from_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            HandoffMode::Rendezvous
        } else {
            HandoffMode::Bounded(capacity)
        }
    }
}

struct Slot<T> {
    item: T,
    /// Set in rendezvous mode. Fired by the receiver on take.
    taken: Option<oneshot::Sender<()>>,
}

/// Sending half of a handoff channel.
pub struct HandoffSender<T> {
    tx: mpsc::Sender<Slot<T>>,
    mode: HandoffMode,
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            mode: self.mode,
        }
    }
}

/// Receiving half of a handoff channel.
pub struct HandoffReceiver<T> {
    rx: mpsc::Receiver<Slot<T>>,
}

/// Create a handoff channel. `capacity == 0` gives a rendezvous channel.
#[must_use]
pub fn handoff_channel<T>(capacity: usize) -> (HandoffSender<T>, HandoffReceiver<T>) {
    let mode = HandoffMode::from_capacity(capacity);
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (HandoffSender { tx, mode }, HandoffReceiver { rx })
}

impl<T> HandoffSender<T> {
    /// Hand `item` to the receiver.
    ///
    /// In rendezvous mode this waits until the receiver has taken the item.
    /// Returns [`HandoffError::Closed`] when the receiver is gone, including
    /// when it is dropped with the item still queued.
    pub async fn send(&self, item: T) -> Result<(), HandoffError> {
        match self.mode {
            HandoffMode::Bounded(_) => self
                .tx
                .send(Slot { item, taken: None })
                .await
                .map_err(|_| HandoffError::Closed),
            HandoffMode::Rendezvous => {
                let (taken_tx, taken_rx) = oneshot::channel();
                self.tx
                    .send(Slot {
                        item,
                        taken: Some(taken_tx),
                    })
                    .await
                    .map_err(|_| HandoffError::Closed)?;
                taken_rx.await.map_err(|_| HandoffError::Closed)
            }
        }
    }

    /// Whether the receiver has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the receiver has been dropped.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }

    #[must_use]
    pub fn mode(&self) -> HandoffMode {
        self.mode
    }
}

impl<T> HandoffReceiver<T> {
    /// Take the next item, or `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<T> {
        let slot = self.rx.recv().await?;
        if let Some(taken) = slot.taken {
            if taken.send(()).is_err() {
                trace!("Handoff sender gone before take was acknowledged");
            }
        }
        Some(slot.item)
    }

    /// Stop accepting new items. Queued items can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
