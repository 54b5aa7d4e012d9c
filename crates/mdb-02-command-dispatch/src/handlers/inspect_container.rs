//! `inspect_docker` - report a container's state by name. Read-only, no lock.

use async_trait::async_trait;
use mdb_01_runtime_adapter::RuntimeApi;
use shared_types::{ContainerNameParams, InspectContainerResult, RpcError, RpcRequest};
use std::sync::Arc;

use crate::ports::{decode_params, encode_result, CommandHandler};

/// Handler for `inspect_docker`.
pub struct InspectContainerHandler {
    runtime: Arc<dyn RuntimeApi>,
}

impl InspectContainerHandler {
    pub fn new(runtime: Arc<dyn RuntimeApi>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl CommandHandler for InspectContainerHandler {
    async fn handle(&self, request: &RpcRequest) -> Result<serde_json::Value, RpcError> {
        let params: ContainerNameParams = decode_params(&request.params)?;
        let lookup = self.runtime.lookup_container(&params.container_name).await;

        encode_result(&InspectContainerResult {
            container_id: lookup.id().map(str::to_string),
            state: lookup.state(),
            container_name: params.container_name,
        })
    }
}
