//! # Command Handler Port
//!
//! One implementation per bus method.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{RpcError, RpcRequest};

/// Handler for one bus method.
///
/// The dispatcher has already validated the envelope and resolved the
/// method. The handler owns everything after that: decoding `params`,
/// calling the runtime and shaping the `result`.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, request: &RpcRequest) -> Result<serde_json::Value, RpcError>;
}

/// Decode `params` into `T` in one typed step. Any failure is `INVALID_PARAMS`.
pub fn decode_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, RpcError> {
    serde_json::from_value(params.clone()).map_err(|e| RpcError::invalid_params(e.to_string()))
}

/// Encode a handler result.
pub fn encode_result<T: Serialize>(result: &T) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
}
