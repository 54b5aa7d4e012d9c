//! # Shared Types Crate
//!
//! Wire envelopes, the error taxonomy and typed command payloads used by
//! every component of the bridge.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Everything that crosses the bus is defined here.
//! - **Exclusive Outcome**: A response holds a result or an error, never both.
//!   The envelope type enforces it.
//! - **Decode Is Validation**: Command parameters are checked while they are
//!   deserialized. There is no second schema pass.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ipc;

pub use entities::*;
pub use envelope::{RpcOutcome, RpcRequest, RpcResponse, PROTOCOL_VERSION};
pub use errors::*;
pub use ipc::*;
