//! `start_docker` - create and start a container from a local image.

use async_trait::async_trait;
use mdb_01_runtime_adapter::RuntimeApi;
use shared_types::{RpcError, RpcRequest, StartContainerParams, StartContainerResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::LifecycleLock;
use crate::ports::{decode_params, encode_result, CommandHandler};

/// Handler for `start_docker`.
pub struct StartContainerHandler {
    runtime: Arc<dyn RuntimeApi>,
    lock: LifecycleLock,
}

impl StartContainerHandler {
    pub fn new(runtime: Arc<dyn RuntimeApi>, lock: LifecycleLock) -> Self {
        Self { runtime, lock }
    }
}

#[async_trait]
impl CommandHandler for StartContainerHandler {
    async fn handle(&self, request: &RpcRequest) -> Result<serde_json::Value, RpcError> {
        let params: StartContainerParams = decode_params(&request.params)?;

        // Held from the image check until the container is started.
        let _guard = self.lock.acquire().await;
        debug!(request_id = request.id, container_name = %params.container_name, "Lifecycle lock acquired");

        if !self.runtime.image_exists(&params.image_name).await {
            info!(image = %params.image_name, "Rejecting start, image not present on host");
            return Err(RpcError::image_not_found(&params.image_name));
        }

        let started = self.runtime.create_and_start(&params).await.map_err(|e| {
            warn!(container_name = %params.container_name, error = %e, "Container start failed");
            RpcError::internal(e.to_string())
        })?;

        encode_result(&StartContainerResult {
            container_id: started.id,
            warnings: started.warnings,
        })
    }
}
