//! Cross-crate flows.
//!
//! - `command_flow`: payload → dispatcher → runtime adapter → in-memory runtime
//! - `event_flow`: in-memory runtime events → adapter stream → event bridge →
//!   outbound notifications

pub mod command_flow;
pub mod event_flow;

use mdb_01_runtime_adapter::adapters::InMemoryRuntime;
use mdb_01_runtime_adapter::{RuntimeAdapter, RuntimeAdapterConfig};
use mdb_02_command_dispatch::{CommandDispatcher, LifecycleLock};
use std::sync::Arc;

/// Runtime adapter plus dispatcher over `memory`.
pub fn bridge_over(memory: Arc<InMemoryRuntime>) -> (Arc<RuntimeAdapter>, CommandDispatcher) {
    let adapter = Arc::new(RuntimeAdapter::new(memory, RuntimeAdapterConfig::for_testing()));
    let dispatcher = CommandDispatcher::with_default_handlers(adapter.clone(), LifecycleLock::new())
        .expect("default handlers register");
    (adapter, dispatcher)
}
