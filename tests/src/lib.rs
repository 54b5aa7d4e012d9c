//! # MQTT-Docker Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Dispatcher and handoff throughput
//! └── src/integration/  # Cross-crate flows over the in-memory runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::event_flow
//! cargo bench -p bridge-tests
//! ```

pub mod integration;
