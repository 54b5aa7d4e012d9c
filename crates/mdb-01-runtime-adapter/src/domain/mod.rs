//! # Domain Module
//!
//! Core types for the runtime adapter: name-keyed container values, raw event
//! normalization and the event subscription state machine.

pub mod entities;
pub mod errors;
pub mod normalize;
pub mod subscription;

pub use entities::*;
pub use errors::*;
pub use normalize::*;
pub use subscription::*;
