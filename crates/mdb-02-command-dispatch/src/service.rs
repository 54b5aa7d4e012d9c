//! # Command Dispatcher
//!
//! Turns one inbound request into exactly one response.
//!
//! ## Validation Order
//!
//! 1. Payload must be JSON, else `PARSE_ERROR` (no id).
//! 2. The JSON must have the request envelope's shape, else `INVALID_REQUEST`
//!    carrying the id when one is readable.
//! 3. `jsonrpc` must be `"2.0"`, else `INVALID_REQUEST`. The registry is not
//!    consulted.
//! 4. `method` must be registered, else `METHOD_NOT_FOUND`.
//! 5. The handler's outcome is wrapped with the request id.

use mdb_01_runtime_adapter::RuntimeApi;
use serde_json::Value;
use shared_types::{RpcError, RpcRequest, RpcResponse};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    HandlerRegistry, LifecycleLock, RegistryError, INSPECT_CONTAINER, START_CONTAINER,
    STOP_CONTAINER,
};
use crate::handlers::{InspectContainerHandler, StartContainerHandler, StopContainerHandler};

/// Method-keyed command dispatcher.
#[derive(Debug)]
pub struct CommandDispatcher {
    registry: HandlerRegistry,
}

impl CommandDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Dispatcher with `start_docker`, `inspect_docker` and `stop_docker`.
    ///
    /// Start and stop share `lock`.
    pub fn with_default_handlers(
        runtime: Arc<dyn RuntimeApi>,
        lock: LifecycleLock,
    ) -> Result<Self, RegistryError> {
        let registry = HandlerRegistry::builder()
            .register(
                START_CONTAINER,
                Arc::new(StartContainerHandler::new(runtime.clone(), lock.clone())),
            )?
            .register(
                INSPECT_CONTAINER,
                Arc::new(InspectContainerHandler::new(runtime.clone())),
            )?
            .register(
                STOP_CONTAINER,
                Arc::new(StopContainerHandler::new(runtime, lock)),
            )?
            .build();
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatch a decoded request.
    pub async fn dispatch(&self, request: &RpcRequest) -> RpcResponse {
        if !request.has_supported_version() {
            debug!(request_id = request.id, jsonrpc = %request.jsonrpc, "Unsupported protocol version");
            return RpcResponse::failure(
                Some(request.id),
                RpcError::invalid_request(format!(
                    "unsupported jsonrpc version '{}'",
                    request.jsonrpc
                )),
            );
        }

        let Some(handler) = self.registry.get(&request.method) else {
            debug!(request_id = request.id, method = %request.method, "Unknown method");
            return RpcResponse::failure(
                Some(request.id),
                RpcError::method_not_found(&request.method),
            );
        };

        debug!(request_id = request.id, method = %request.method, "Dispatching command");
        let outcome = handler.handle(request).await;
        if let Err(e) = &outcome {
            debug!(request_id = request.id, method = %request.method, error = %e, "Command failed");
        }
        RpcResponse::from_outcome(request.id, outcome)
    }

    /// Decode a raw bus payload and dispatch it.
    pub async fn handle_payload(&self, payload: &[u8]) -> RpcResponse {
        let value = match serde_json::from_slice::<Value>(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, bytes = payload.len(), "Discarding undecodable command payload");
                return RpcResponse::failure(None, RpcError::parse_error(e.to_string()));
            }
        };
        let id = value.get("id").and_then(Value::as_i64);
        match serde_json::from_value::<RpcRequest>(value) {
            Ok(request) => self.dispatch(&request).await,
            Err(e) => {
                warn!(request_id = ?id, error = %e, "Malformed request envelope");
                RpcResponse::failure(id, RpcError::invalid_request(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::CommandHandler;
    use async_trait::async_trait;
    use mdb_01_runtime_adapter::adapters::InMemoryRuntime;
    use mdb_01_runtime_adapter::{RuntimeAdapter, RuntimeAdapterConfig};
    use serde_json::json;
    use shared_types::{codes, StartContainerResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl CommandHandler for Counting {
        async fn handle(&self, _request: &RpcRequest) -> Result<serde_json::Value, RpcError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(json!("ok"))
        }
    }

    fn counting_dispatcher() -> (CommandDispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = HandlerRegistry::builder()
            .register("start_docker", Arc::new(Counting(calls.clone())))
            .unwrap()
            .build();
        (CommandDispatcher::new(registry), calls)
    }

    fn default_dispatcher(memory: Arc<InMemoryRuntime>) -> CommandDispatcher {
        let runtime = Arc::new(RuntimeAdapter::new(memory, RuntimeAdapterConfig::for_testing()));
        CommandDispatcher::with_default_handlers(runtime, LifecycleLock::new()).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_version_never_reaches_handler() {
        let (dispatcher, calls) = counting_dispatcher();
        for version in ["1.0", "", "2"] {
            let mut request = RpcRequest::new(5, "start_docker", json!({}));
            request.jsonrpc = version.to_string();
            let response = dispatcher.dispatch(&request).await;
            assert_eq!(response.id, Some(5));
            assert_eq!(response.error().unwrap().code, codes::INVALID_REQUEST);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_method_named_in_error() {
        let (dispatcher, calls) = counting_dispatcher();
        let response = dispatcher
            .dispatch(&RpcRequest::new(2, "reboot_host", json!({})))
            .await;
        let error = response.error().unwrap();
        assert_eq!(error.code, codes::METHOD_NOT_FOUND);
        assert!(error.message.contains("reboot_host"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_result_wrapped_with_id() {
        let (dispatcher, calls) = counting_dispatcher();
        let response = dispatcher
            .dispatch(&RpcRequest::new(77, "start_docker", json!({})))
            .await;
        assert_eq!(response.id, Some(77));
        assert_eq!(response.result(), Some(&json!("ok")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_garbage_payload_is_parse_error() {
        let (dispatcher, _) = counting_dispatcher();
        let payloads: [&[u8]; 3] = [b"{not json", b"", b"\xff\xfe"];
        for payload in payloads {
            let response = dispatcher.handle_payload(payload).await;
            assert_eq!(response.id, None);
            assert_eq!(response.error().unwrap().code, codes::PARSE_ERROR);
        }
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_invalid_request() {
        let (dispatcher, calls) = counting_dispatcher();
        let cases: [(&[u8], Option<i64>); 4] = [
            (b"[]", None),
            (br#"{"jsonrpc":"2.0","method":"start_docker"}"#, None),
            (br#"{"jsonrpc":"2.0","id":4}"#, Some(4)),
            (br#"{"jsonrpc":2,"id":9,"method":"start_docker"}"#, Some(9)),
        ];
        for (payload, id) in cases {
            let response = dispatcher.handle_payload(payload).await;
            assert_eq!(response.id, id);
            assert_eq!(response.error().unwrap().code, codes::INVALID_REQUEST);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_handlers_registered() {
        let dispatcher = default_dispatcher(Arc::new(InMemoryRuntime::new()));
        assert_eq!(
            dispatcher.registry().methods(),
            vec!["inspect_docker", "start_docker", "stop_docker"]
        );
    }

    #[tokio::test]
    async fn test_start_scenario_round_trip() {
        let dispatcher = default_dispatcher(Arc::new(InMemoryRuntime::new().with_image("nginx")));
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "start_docker",
            "params": {"imageName": "nginx", "containerName": "web1", "ports": ["80/tcp:8080"]}
        });
        let response = dispatcher
            .handle_payload(&serde_json::to_vec(&payload).unwrap())
            .await;

        let wire = response.to_bytes().unwrap();
        let decoded: RpcResponse = serde_json::from_slice(&wire).unwrap();
        assert_eq!(decoded.id, Some(1));
        let result: StartContainerResult =
            serde_json::from_value(decoded.result().unwrap().clone()).unwrap();
        let direct: StartContainerResult =
            serde_json::from_value(response.result().unwrap().clone()).unwrap();
        assert_eq!(result, direct);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_image_scenario() {
        let dispatcher = default_dispatcher(Arc::new(InMemoryRuntime::new().with_image("nginx")));
        let response = dispatcher
            .dispatch(&RpcRequest::new(
                1,
                "start_docker",
                json!({"imageName": "ghost-image", "containerName": "web1"}),
            ))
            .await;
        assert_eq!(response.id, Some(1));
        assert_eq!(response.error().unwrap().code, -32604);
    }
}
