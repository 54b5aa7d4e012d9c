//! # Error Types
//!
//! The wire-level error carried in a response envelope, plus the parse errors
//! raised while decoding typed command parameters.
//!
//! Codes follow the JSON-RPC 2.0 reserved range, extended with one
//! domain-specific code for images missing from the local host.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// JSON-RPC error codes used on the bus.
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Domain extension: requested image is not present on the host
    pub const IMAGE_NOT_FOUND: i32 = -32604;
}

/// Error object carried in the `error` member of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// JSON-RPC error code
    pub code: i32,
    /// Human-readable message
    pub message: String,
}

impl RpcError {
    /// Create a new error with an explicit code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parse error - payload is not valid JSON or not an envelope
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Invalid request - envelope is not an acceptable request
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    /// Invalid parameters
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, details.into())
    }

    /// Image is not present in the local image store
    pub fn image_not_found(image: &str) -> Self {
        Self::new(
            codes::IMAGE_NOT_FOUND,
            format!("Image not found on host: {}", image),
        )
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            RpcError::parse_error(e.to_string())
        } else {
            RpcError::invalid_params(e.to_string())
        }
    }
}

/// Errors from parsing a `"source:target"` pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairParseError {
    /// The pair did not contain exactly one `:`.
    #[error("expected exactly one ':' separator in '{0}'")]
    Separator(String),

    /// One side of the pair was empty.
    #[error("empty side in '{0}'")]
    EmptySide(String),
}

/// Error from parsing a restart policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown restart policy '{0}' (expected no, always, unless-stopped or on-failure)")]
pub struct RestartPolicyParseError(pub String);
