//! # Host Identity
//!
//! The host-info YAML names this machine. Its `instance_id` keys both bus
//! topics, and the whole document is the heartbeat payload.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

const INSTANCE_ID_KEY: &str = "instance_id";

#[derive(Debug, Error)]
pub enum HostInfoError {
    #[error("failed to read host info {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse host info: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("host info has no string 'instance_id'")]
    MissingInstanceId,
}

/// Parsed host identity document.
#[derive(Debug, Clone, PartialEq)]
pub struct HostInfo {
    instance_id: String,
    document: Value,
}

impl HostInfo {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostInfoError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| HostInfoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, HostInfoError> {
        let document: Value = serde_yaml::from_str(raw)?;
        let instance_id = document
            .get(INSTANCE_ID_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(HostInfoError::MissingInstanceId)?
            .to_string();
        Ok(Self {
            instance_id,
            document,
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Heartbeat payload.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.document)
    }
}
