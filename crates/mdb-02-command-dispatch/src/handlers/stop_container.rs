//! `stop_docker` - stop a container by name under the lifecycle lock.

use async_trait::async_trait;
use mdb_01_runtime_adapter::{RuntimeApi, RuntimeError};
use shared_types::{ContainerNameParams, RpcError, RpcRequest, StopContainerResult};
use std::sync::Arc;
use tracing::warn;

use crate::domain::LifecycleLock;
use crate::ports::{decode_params, encode_result, CommandHandler};

/// Handler for `stop_docker`.
pub struct StopContainerHandler {
    runtime: Arc<dyn RuntimeApi>,
    lock: LifecycleLock,
}

impl StopContainerHandler {
    pub fn new(runtime: Arc<dyn RuntimeApi>, lock: LifecycleLock) -> Self {
        Self { runtime, lock }
    }
}

#[async_trait]
impl CommandHandler for StopContainerHandler {
    async fn handle(&self, request: &RpcRequest) -> Result<serde_json::Value, RpcError> {
        let params: ContainerNameParams = decode_params(&request.params)?;
        let _guard = self.lock.acquire().await;

        let outcome = self
            .runtime
            .stop_container(&params.container_name)
            .await
            .map_err(|e| match e {
                RuntimeError::ContainerNotFound(name) => {
                    RpcError::invalid_params(format!("container not found: {}", name))
                }
                other => {
                    warn!(container_name = %params.container_name, error = %other, "Container stop failed");
                    RpcError::internal(other.to_string())
                }
            })?;

        encode_result(&StopContainerResult {
            container_name: params.container_name,
            container_id: outcome.container_id,
            was_running: outcome.was_running,
        })
    }
}
