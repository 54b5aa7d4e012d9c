//! # Command Flow
//!
//! Raw payload → `CommandDispatcher` → `RuntimeAdapter` → `InMemoryRuntime`.
//!
//! Covers the full start/inspect/stop lifecycle of one container, the image
//! presence gate and the lifecycle lock under concurrent starts.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use mdb_01_runtime_adapter::adapters::{FailPoint, InMemoryRuntime, RuntimeCall};
    use mdb_01_runtime_adapter::{RuntimeApi, RuntimeAdapter, RuntimeAdapterConfig};
    use mdb_02_command_dispatch::{CommandDispatcher, LifecycleLock};
    use serde_json::{json, Value};
    use shared_types::{
        codes, ContainerState, InspectContainerResult, RpcResponse, StartContainerResult,
        StopContainerResult,
    };

    use crate::integration::bridge_over;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn call(dispatcher: &CommandDispatcher, id: i64, method: &str, params: Value) -> RpcResponse {
        let payload = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        let response = dispatcher
            .handle_payload(&serde_json::to_vec(&payload).unwrap())
            .await;
        // Everything the transport would publish must survive the wire.
        serde_json::from_slice(&response.to_bytes().unwrap()).unwrap()
    }

    fn result<T: serde::de::DeserializeOwned>(response: &RpcResponse) -> T {
        serde_json::from_value(response.result().expect("success response").clone()).unwrap()
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_start_inspect_stop_lifecycle() {
        let memory = Arc::new(InMemoryRuntime::new().with_image("nginx:latest"));
        let (_adapter, dispatcher) = bridge_over(memory.clone());

        let started = call(
            &dispatcher,
            1,
            "start_docker",
            json!({
                "imageName": "nginx:latest",
                "containerName": "web1",
                "restartPolicy": "unless-stopped",
                "environment": ["MODE=edge"],
                "ports": ["80/tcp:8080"],
                "volumes": ["/srv/www:/usr/share/nginx/html"],
                "commands": ["nginx", "-g", "daemon off;"]
            }),
        )
        .await;
        assert_eq!(started.id, Some(1));
        let started: StartContainerResult = result(&started);
        assert!(started.warnings.is_empty());

        let spec = memory.created_specs().pop().unwrap();
        assert_eq!(spec.name, "web1");
        assert_eq!(spec.hostname, "web1");
        assert_eq!(spec.working_dir, "/app");
        assert_eq!(spec.network_id, "mdb-test-net");
        assert_eq!(spec.ports[0].container_port, "80/tcp");
        assert_eq!(spec.ports[0].host_port, "8080");
        assert_eq!(spec.volumes[0].target, "/usr/share/nginx/html");

        let inspected: InspectContainerResult =
            result(&call(&dispatcher, 2, "inspect_docker", json!({"containerName": "web1"})).await);
        assert_eq!(inspected.state, ContainerState::Running);
        assert_eq!(inspected.container_id.as_deref(), Some(started.container_id.as_str()));

        let stopped: StopContainerResult =
            result(&call(&dispatcher, 3, "stop_docker", json!({"containerName": "web1"})).await);
        assert!(stopped.was_running);
        assert_eq!(stopped.container_id, started.container_id);

        let inspected: InspectContainerResult =
            result(&call(&dispatcher, 4, "inspect_docker", json!({"containerName": "web1"})).await);
        assert_eq!(inspected.state, ContainerState::Stopped);

        let stopped_again: StopContainerResult =
            result(&call(&dispatcher, 5, "stop_docker", json!({"containerName": "web1"})).await);
        assert!(!stopped_again.was_running);
    }

    #[tokio::test]
    async fn test_unknown_container_inspect_and_stop() {
        let (_adapter, dispatcher) = bridge_over(Arc::new(InMemoryRuntime::new()));

        let inspected: InspectContainerResult =
            result(&call(&dispatcher, 1, "inspect_docker", json!({"containerName": "ghost"})).await);
        assert_eq!(inspected.state, ContainerState::NotFound);
        assert!(inspected.container_id.is_none());

        let stop = call(&dispatcher, 2, "stop_docker", json!({"containerName": "ghost"})).await;
        assert_eq!(stop.error().unwrap().code, codes::INVALID_PARAMS);
    }

    // =============================================================================
    // IMAGE GATE
    // =============================================================================

    #[tokio::test]
    async fn test_absent_image_never_creates() {
        let memory = Arc::new(InMemoryRuntime::new().with_image("nginx"));
        let (_adapter, dispatcher) = bridge_over(memory.clone());

        let response = call(
            &dispatcher,
            1,
            "start_docker",
            json!({"imageName": "ghost-image", "containerName": "web1"}),
        )
        .await;
        assert_eq!(response.id, Some(1));
        assert_eq!(response.error().unwrap().code, codes::IMAGE_NOT_FOUND);
        assert!(!memory
            .calls()
            .iter()
            .any(|c| matches!(c, RuntimeCall::CreateContainer(_) | RuntimeCall::PullImage(_))));
    }

    #[tokio::test]
    async fn test_image_listing_failure_reads_as_absent() {
        let memory = Arc::new(InMemoryRuntime::new().with_image("nginx"));
        memory.fail(FailPoint::ListImages);
        let (_adapter, dispatcher) = bridge_over(memory.clone());

        let response = call(
            &dispatcher,
            1,
            "start_docker",
            json!({"imageName": "nginx", "containerName": "web1"}),
        )
        .await;
        assert_eq!(response.error().unwrap().code, codes::IMAGE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_runtime_failure_is_internal_error() {
        let memory = Arc::new(InMemoryRuntime::new().with_image("nginx"));
        memory.fail(FailPoint::StartContainer);
        let (_adapter, dispatcher) = bridge_over(memory.clone());

        let response = call(
            &dispatcher,
            1,
            "start_docker",
            json!({"imageName": "nginx", "containerName": "web1"}),
        )
        .await;
        let error = response.error().unwrap();
        assert_eq!(error.code, codes::INTERNAL_ERROR);
        assert!(error.message.contains("injected failure"));
    }

    #[tokio::test]
    async fn test_bad_params_rejected_before_runtime() {
        let memory = Arc::new(InMemoryRuntime::new().with_image("nginx"));
        let (_adapter, dispatcher) = bridge_over(memory.clone());

        for params in [
            json!({"containerName": "web1"}),
            json!({"imageName": "nginx", "containerName": "web1", "ports": ["80"]}),
            json!({"imageName": "nginx", "containerName": "web1", "volumes": ["/a:/b:/c"]}),
        ] {
            let response = call(&dispatcher, 1, "start_docker", params).await;
            assert_eq!(response.error().unwrap().code, codes::INVALID_PARAMS);
        }
        assert!(memory.calls().is_empty());
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_are_serialized() {
        let memory = Arc::new(
            InMemoryRuntime::new()
                .with_image("nginx")
                .with_op_delay(Duration::from_millis(5)),
        );
        let (_adapter, dispatcher) = bridge_over(memory.clone());
        let dispatcher = Arc::new(dispatcher);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    call(
                        &dispatcher,
                        i,
                        "start_docker",
                        json!({"imageName": "nginx", "containerName": format!("web{}", i)}),
                    )
                    .await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let response = handle.await.unwrap();
            assert_eq!(response.id, Some(i as i64));
            assert!(response.is_success(), "start {} failed: {:?}", i, response.error());
        }
        assert_eq!(memory.max_concurrent_starts(), 1);
        assert_eq!(memory.created_specs().len(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_inspect_not_blocked_by_held_lock() {
        let memory = Arc::new(InMemoryRuntime::new().with_container("web1", "nginx", true));
        let adapter = Arc::new(RuntimeAdapter::new(memory, RuntimeAdapterConfig::for_testing()));
        let lock = LifecycleLock::new();
        let dispatcher =
            CommandDispatcher::with_default_handlers(adapter.clone(), lock.clone()).unwrap();

        let _held = lock.acquire().await;
        let inspected = tokio::time::timeout(
            Duration::from_secs(1),
            call(&dispatcher, 1, "inspect_docker", json!({"containerName": "web1"})),
        )
        .await
        .expect("inspect must not wait for the lifecycle lock");
        let inspected: InspectContainerResult = result(&inspected);
        assert_eq!(inspected.state, ContainerState::Running);

        // Lookups are idempotent with no intervening mutation.
        assert_eq!(
            adapter.lookup_container("web1").await,
            adapter.lookup_container("web1").await
        );
    }
}
