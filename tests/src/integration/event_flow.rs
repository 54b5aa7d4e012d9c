//! # Event Flow
//!
//! Commands → `InMemoryRuntime` events → `RuntimeAdapter::stream_events` →
//! `EventBridge` → outbound notifications.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use mdb_01_runtime_adapter::adapters::InMemoryRuntime;
    use mdb_03_event_bridge::{EventBridge, EventBridgeConfig};
    use serde_json::json;
    use shared_bus::HandoffReceiver;
    use shared_types::{EventNotificationResult, LifecycleStatus, RpcResponse};
    use tokio::time::timeout;

    use crate::integration::bridge_over;

    async fn next(notifications: &mut HandoffReceiver<RpcResponse>) -> RpcResponse {
        timeout(Duration::from_secs(2), notifications.recv())
            .await
            .expect("notification in time")
            .expect("bridge still running")
    }

    fn payload(response: &RpcResponse) -> EventNotificationResult {
        serde_json::from_value(response.result().unwrap().clone()).unwrap()
    }

    #[tokio::test]
    async fn test_start_then_die_notifications() {
        let memory = Arc::new(InMemoryRuntime::new().with_image("nginx"));
        let (adapter, dispatcher) = bridge_over(memory.clone());
        let (handle, mut notifications) =
            EventBridge::new(adapter, EventBridgeConfig::default()).start();
        memory.wait_for_subscribers(1).await;

        let dispatch = tokio::spawn(async move {
            let request = json!({
                "jsonrpc": "2.0", "id": 1, "method": "start_docker",
                "params": {"imageName": "nginx", "containerName": "web1"}
            });
            dispatcher
                .handle_payload(&serde_json::to_vec(&request).unwrap())
                .await
        });

        let create = next(&mut notifications).await;
        let start = next(&mut notifications).await;
        let response = dispatch.await.unwrap();
        assert!(response.is_success());

        memory.kill_container("web1", 137);
        let die = next(&mut notifications).await;

        assert_eq!(create.method.as_deref(), Some("docker_event_create"));
        assert_eq!(start.method.as_deref(), Some("docker_event_start"));
        assert_eq!(die.method.as_deref(), Some("docker_event_die"));

        let die = payload(&die);
        assert_eq!(die.status, LifecycleStatus::Die);
        assert_eq!(die.name, "web1");
        assert_eq!(die.image, "nginx");
        assert_eq!(die.exit_code, Some(137));
        assert_eq!(die.container_id, payload(&create).container_id);

        handle.abort();
    }

    #[tokio::test]
    async fn test_irrelevant_events_are_dropped() {
        let memory = Arc::new(InMemoryRuntime::new());
        let (adapter, _dispatcher) = bridge_over(memory.clone());
        let (handle, mut notifications) =
            EventBridge::new(adapter, EventBridgeConfig::default()).start();
        memory.wait_for_subscribers(1).await;

        memory.emit_unfiltered("pause", Some("c1"));
        memory.emit_unfiltered("start", None);
        memory.emit_raw("start", "c2", &[("name", "web2"), ("image", "redis")]);

        let only = next(&mut notifications).await;
        let only = payload(&only);
        assert_eq!(only.container_id, "c2");
        assert_eq!(only.exit_code, None);

        handle.abort();
    }

    #[tokio::test]
    async fn test_feed_error_resubscribes_and_keeps_streaming() {
        let memory = Arc::new(InMemoryRuntime::new());
        let (adapter, _dispatcher) = bridge_over(memory.clone());
        let (handle, mut notifications) =
            EventBridge::new(adapter, EventBridgeConfig::default()).start();
        memory.wait_for_subscribers(1).await;

        memory.feed_error("daemon restarted");
        memory.wait_for_subscribers(2).await;
        memory.emit_raw("create", "c9", &[("name", "after-restart")]);

        let notification = payload(&next(&mut notifications).await);
        assert_eq!(notification.name, "after-restart");
        assert_eq!(notification.status, LifecycleStatus::Create);

        handle.abort();
    }

    #[tokio::test]
    async fn test_rendezvous_stalls_producer_until_taken() {
        let memory = Arc::new(InMemoryRuntime::new());
        let (adapter, _dispatcher) = bridge_over(memory.clone());
        let (handle, mut notifications) =
            EventBridge::new(adapter, EventBridgeConfig::default()).start();
        memory.wait_for_subscribers(1).await;

        for i in 0..5 {
            memory.emit_raw("start", &format!("c{}", i), &[]);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        for i in 0..5 {
            let n = payload(&next(&mut notifications).await);
            assert_eq!(n.container_id, format!("c{}", i));
        }

        drop(notifications);
        memory.emit_raw("start", "late", &[]);
        let outcome = timeout(Duration::from_secs(2), handle.join()).await.unwrap();
        assert!(outcome.is_ok());
    }
}
