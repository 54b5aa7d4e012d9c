//! # Domain Module

pub mod notification;

pub use notification::*;
