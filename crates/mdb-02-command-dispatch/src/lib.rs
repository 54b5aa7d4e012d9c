//! # Command Dispatcher
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Domain + Ports/Handlers)
//!
//! Validates inbound JSON-RPC envelopes, resolves the method in an immutable
//! handler registry and shapes the response. Container-mutating handlers
//! share one injectable [`LifecycleLock`], so at most one create/start or stop
//! runs at a time.
//!
//! ## Module Structure
//!
//! ```text
//! mdb-02-command-dispatch/
//! ├── domain/          # Method names, HandlerRegistry, LifecycleLock
//! ├── ports/           # CommandHandler trait + params decode helpers
//! ├── handlers/        # start_docker, inspect_docker, stop_docker
//! └── service.rs       # CommandDispatcher
//! ```

#![warn(clippy::all)]

pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

pub use domain::{
    method_info, HandlerRegistry, HandlerRegistryBuilder, LifecycleGuard, LifecycleLock,
    MethodInfo, RegistryError, DEFAULT_METHODS, INSPECT_CONTAINER, START_CONTAINER,
    STOP_CONTAINER,
};
pub use handlers::{InspectContainerHandler, StartContainerHandler, StopContainerHandler};
pub use ports::{decode_params, encode_result, CommandHandler};
pub use service::CommandDispatcher;
