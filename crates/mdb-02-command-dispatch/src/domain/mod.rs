//! # Domain Module
//!
//! Method names, the handler registry and the lifecycle lock.

pub mod lock;
pub mod methods;
pub mod registry;

pub use lock::*;
pub use methods::*;
pub use registry::*;
