//! # Shared Bus - Handoff Channels Between Components
//!
//! Moves items from a producer task to a consumer task with explicit
//! backpressure.
//!
//! ```text
//! ┌──────────────┐   send()    ┌──────────────┐   recv()    ┌──────────────┐
//! │  Producer    │ ──────────▶ │   Handoff    │ ──────────▶ │  Consumer    │
//! │ (event feed) │ ◀─ ack ──── │ (0 or N slot)│             │ (transport)  │
//! └──────────────┘             └──────────────┘             └──────────────┘
//! ```
//!
//! The default is rendezvous: the producer is released only when the consumer
//! takes the item, so ordering and pacing hold end to end.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod handoff;

pub use handoff::{handoff_channel, HandoffError, HandoffMode, HandoffReceiver, HandoffSender};

/// Default capacity: rendezvous.
pub const DEFAULT_HANDOFF_CAPACITY: usize = 0;
