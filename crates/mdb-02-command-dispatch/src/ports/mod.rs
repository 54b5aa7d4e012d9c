//! # Ports Module

pub mod handler;

pub use handler::*;
