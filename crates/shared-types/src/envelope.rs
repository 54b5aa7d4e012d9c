//! # JSON-RPC Envelope
//!
//! Request, response and notification envelopes exchanged over the bus.
//!
//! - A request carries `{jsonrpc, id, method, params}`. `params` stays opaque
//!   until a handler decodes it.
//! - A response carries `{jsonrpc, id, result | error}`. The outcome is an enum
//!   flattened into the envelope, so exactly one of `result` and `error` is
//!   ever present.
//! - A notification is a response with `method` set and no `id`.

use crate::errors::RpcError;
use serde::{Deserialize, Serialize};

/// Protocol version tag accepted on inbound requests.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Inbound command request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version tag. Missing tags decode as empty and are rejected
    /// by the dispatcher.
    #[serde(default)]
    pub jsonrpc: String,
    /// Correlation id echoed in the response.
    pub id: i64,
    /// Handler selector.
    pub method: String,
    /// Method-specific payload.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    /// Build a request with the supported protocol tag.
    pub fn new(id: i64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Whether the protocol tag matches [`PROTOCOL_VERSION`].
    pub fn has_supported_version(&self) -> bool {
        self.jsonrpc == PROTOCOL_VERSION
    }
}

/// Outcome half of a response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RpcOutcome {
    #[serde(rename = "result")]
    Result(serde_json::Value),
    #[serde(rename = "error")]
    Error(RpcError),
}

/// Outbound response or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol version tag, always [`PROTOCOL_VERSION`] on output.
    pub jsonrpc: String,
    /// Id of the request being answered. Absent on notifications and on
    /// parse errors where no id could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Notification method name. Absent on responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(flatten)]
    pub outcome: RpcOutcome,
}

impl RpcResponse {
    /// Successful response to request `id`.
    pub fn success(id: i64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            id: Some(id),
            method: None,
            outcome: RpcOutcome::Result(result),
        }
    }

    /// Error response. `id` is `None` when the request could not be read.
    pub fn failure(id: Option<i64>, error: RpcError) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            id,
            method: None,
            outcome: RpcOutcome::Error(error),
        }
    }

    /// Unsolicited notification carrying `result` under `method`.
    pub fn notification(method: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_string(),
            id: None,
            method: Some(method.into()),
            outcome: RpcOutcome::Result(result),
        }
    }

    /// Build a response from a handler outcome.
    pub fn from_outcome(id: i64, outcome: Result<serde_json::Value, RpcError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(error) => Self::failure(Some(id), error),
        }
    }

    /// The result payload, if this is a success.
    pub fn result(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            RpcOutcome::Result(value) => Some(value),
            RpcOutcome::Error(_) => None,
        }
    }

    /// The error, if this is a failure.
    pub fn error(&self) -> Option<&RpcError> {
        match &self.outcome {
            RpcOutcome::Result(_) => None,
            RpcOutcome::Error(error) => Some(error),
        }
    }

    /// Whether this response carries a result.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RpcOutcome::Result(_))
    }

    /// Serialize to the JSON bytes published on the bus.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
