//! # Event Subscription State Machine
//!
//! ```text
//!   ┌─────────────┐ subscribed ┌───────────┐ event
//!   │ Subscribing │ ─────────▶ │ Streaming │ ◀──┐
//!   └─────────────┘            └───────────┘ ───┘
//!          ▲                         │ feed error / feed ended
//!          │ backoff elapsed         ▼
//!          │                   ┌───────────┐
//!          └────────────────── │  Faulted  │ ◀── subscribe failed
//!                              └───────────┘
//! ```
//!
//! The faulted state waits on an exponential [`Backoff`] before resubscribing.

use rand::Rng;
use std::time::Duration;

/// Subscription loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Subscribing,
    Streaming,
    Faulted,
}

/// Input driving the subscription loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionSignal {
    Subscribed,
    SubscribeFailed,
    Event,
    FeedError,
    FeedEnded,
    BackoffElapsed,
}

impl SubscriptionState {
    /// Next state for `signal`. Signals with no transition from the current
    /// state leave it unchanged.
    pub fn on(self, signal: SubscriptionSignal) -> Self {
        use SubscriptionSignal::*;
        use SubscriptionState::*;

        match (self, signal) {
            (Subscribing, Subscribed) => Streaming,
            (Subscribing, SubscribeFailed) => Faulted,
            (Streaming, Event) => Streaming,
            (Streaming, FeedError) | (Streaming, FeedEnded) => Faulted,
            (Faulted, BackoffElapsed) => Subscribing,
            (state, _) => state,
        }
    }
}

/// Default first delay after a fault.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
/// Default delay cap.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Jitter added on top of each delay, as a fraction of it.
const JITTER_RATIO: f64 = 0.1;

/// Exponential backoff: doubles per fault, capped, with small random jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now, without jitter.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Delay to wait now, with jitter. Advances the base delay.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = (self.current * 2).min(self.max);

        let jitter_cap = base.mul_f64(JITTER_RATIO);
        if jitter_cap.is_zero() {
            return base;
        }
        base + rand::thread_rng().gen_range(Duration::ZERO..=jitter_cap)
    }

    /// Back to the initial delay.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF)
    }
}
