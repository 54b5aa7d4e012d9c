//! # In-Memory Runtime
//!
//! A [`ContainerRuntime`] that keeps networks, images and containers in
//! memory. It records every call, injects failures per operation, measures
//! how many create/start sequences overlap, and emits lifecycle events the
//! way the Docker engine does.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::domain::{
    ContainerSummary, CreateContainerSpec, CreatedContainer, EventFilter, NetworkSpec, RawEvent,
    RuntimeError,
};
use crate::ports::{ContainerRuntime, EventFeed};

/// Operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateNetwork,
    ListImages,
    PullImage,
    ListContainers,
    CreateContainer,
    StartContainer,
    StopContainer,
    Subscribe,
}

/// Recorded runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    InspectNetwork(String),
    CreateNetwork(String),
    ListImages,
    PullImage(String),
    ListContainers { all: bool },
    CreateContainer(String),
    StartContainer(String),
    StopContainer(String),
    SubscribeEvents,
}

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    name: String,
    image: String,
    running: bool,
}

type FeedSender = mpsc::UnboundedSender<Result<RawEvent, RuntimeError>>;

#[derive(Default)]
struct State {
    networks: HashSet<String>,
    images: Vec<String>,
    containers: Vec<FakeContainer>,
    calls: Vec<RuntimeCall>,
    created_specs: Vec<CreateContainerSpec>,
    failures: HashSet<FailPoint>,
    feed: Option<(EventFilter, FeedSender)>,
    subscriptions: usize,
    next_id: u64,
}

/// In-memory container runtime for tests.
#[derive(Default)]
pub struct InMemoryRuntime {
    state: Mutex<State>,
    op_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a local image tag.
    pub fn with_image(self, tag: &str) -> Self {
        self.state.lock().images.push(tag.to_string());
        self
    }

    /// Add an existing container.
    pub fn with_container(self, name: &str, image: &str, running: bool) -> Self {
        {
            let mut state = self.state.lock();
            let id = Self::allocate_id(&mut state);
            state.containers.push(FakeContainer {
                id,
                name: name.to_string(),
                image: image.to_string(),
                running,
            });
        }
        self
    }

    /// Add an existing network.
    pub fn with_network(self, id: &str) -> Self {
        self.state.lock().networks.insert(id.to_string());
        self
    }

    /// Delay applied inside create and start, to widen overlap windows.
    pub fn with_op_delay(self, delay: Duration) -> Self {
        *self.op_delay.lock() = delay;
        self
    }

    pub fn fail(&self, point: FailPoint) {
        self.state.lock().failures.insert(point);
    }

    pub fn clear_failure(&self, point: FailPoint) {
        self.state.lock().failures.remove(&point);
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state.lock().calls.clone()
    }

    pub fn created_specs(&self) -> Vec<CreateContainerSpec> {
        self.state.lock().created_specs.clone()
    }

    /// Number of successful event subscriptions so far.
    pub fn subscriptions(&self) -> usize {
        self.state.lock().subscriptions
    }

    /// Largest number of create/start sequences seen in flight at once.
    pub fn max_concurrent_starts(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` subscriptions have been opened.
    pub async fn wait_for_subscribers(&self, count: usize) {
        while self.subscriptions() < count {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    /// Emit a raw event through the current feed, subject to its filter.
    pub fn emit_raw(&self, action: &str, actor_id: &str, attributes: &[(&str, &str)]) {
        let event = RawEvent {
            kind: "container".to_string(),
            action: action.to_string(),
            actor_id: Some(actor_id.to_string()),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        Self::emit(&self.state.lock(), event, true);
    }

    /// Emit a raw container event bypassing the subscription filter.
    pub fn emit_unfiltered(&self, action: &str, actor_id: Option<&str>) {
        let event = RawEvent {
            kind: "container".to_string(),
            action: action.to_string(),
            actor_id: actor_id.map(str::to_string),
            attributes: HashMap::new(),
        };
        Self::emit(&self.state.lock(), event, false);
    }

    /// Push an error into the current feed.
    pub fn feed_error(&self, message: &str) {
        if let Some((_, tx)) = &self.state.lock().feed {
            let _ = tx.send(Err(RuntimeError::Api(message.to_string())));
        }
    }

    /// Close the current feed.
    pub fn end_feed(&self) {
        self.state.lock().feed = None;
    }

    /// Mark a running container as exited and emit its `die` event.
    pub fn kill_container(&self, name: &str, exit_code: i64) {
        let mut state = self.state.lock();
        let Some(container) = state.containers.iter_mut().find(|c| c.name == name) else {
            return;
        };
        container.running = false;
        let event = Self::container_event(container, "die", Some(exit_code));
        Self::emit(&state, event, true);
    }

    fn allocate_id(state: &mut State) -> String {
        state.next_id += 1;
        format!("{:064x}", state.next_id)
    }

    fn check(state: &State, point: FailPoint) -> Result<(), RuntimeError> {
        if state.failures.contains(&point) {
            return Err(RuntimeError::Api(format!("injected failure: {:?}", point)));
        }
        Ok(())
    }

    fn container_event(container: &FakeContainer, action: &str, exit_code: Option<i64>) -> RawEvent {
        let mut attributes = HashMap::from([
            ("name".to_string(), container.name.clone()),
            ("image".to_string(), container.image.clone()),
        ]);
        if let Some(code) = exit_code {
            attributes.insert("exitCode".to_string(), code.to_string());
        }
        RawEvent {
            kind: "container".to_string(),
            action: action.to_string(),
            actor_id: Some(container.id.clone()),
            attributes,
        }
    }

    fn emit(state: &State, event: RawEvent, filtered: bool) {
        let Some((filter, tx)) = &state.feed else {
            return;
        };
        if filtered && !filter.matches(&event) {
            return;
        }
        let _ = tx.send(Ok(event));
    }

    fn enter_start_sequence(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave_start_sequence(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    async fn pause(&self) {
        let delay = *self.op_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryRuntime {
    async fn inspect_network(&self, id: &str) -> Result<String, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::InspectNetwork(id.to_string()));
        if state.networks.contains(id) {
            Ok(id.to_string())
        } else {
            Err(RuntimeError::NotFound(format!("network {} not found", id)))
        }
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::CreateNetwork(spec.id.clone()));
        Self::check(&state, FailPoint::CreateNetwork)?;
        state.networks.insert(spec.id.clone());
        Ok(())
    }

    async fn list_image_tags(&self) -> Result<Vec<String>, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::ListImages);
        Self::check(&state, FailPoint::ListImages)?;
        Ok(state.images.clone())
    }

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::PullImage(image.to_string()));
        Self::check(&state, FailPoint::PullImage)
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::ListContainers { all });
        Self::check(&state, FailPoint::ListContainers)?;
        Ok(state
            .containers
            .iter()
            .filter(|c| all || c.running)
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect())
    }

    async fn create_container(
        &self,
        spec: &CreateContainerSpec,
    ) -> Result<CreatedContainer, RuntimeError> {
        self.enter_start_sequence();
        self.pause().await;

        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::CreateContainer(spec.name.clone()));
        let outcome = Self::check(&state, FailPoint::CreateContainer).and_then(|()| {
            if state.containers.iter().any(|c| c.name == spec.name) {
                return Err(RuntimeError::Api(format!(
                    "Conflict. The container name \"/{}\" is already in use",
                    spec.name
                )));
            }
            Ok(())
        });
        if let Err(e) = outcome {
            drop(state);
            self.leave_start_sequence();
            return Err(e);
        }

        let id = Self::allocate_id(&mut state);
        let container = FakeContainer {
            id: id.clone(),
            name: spec.name.clone(),
            image: spec.image.clone(),
            running: false,
        };
        let event = Self::container_event(&container, "create", None);
        state.containers.push(container);
        state.created_specs.push(spec.clone());
        Self::emit(&state, event, true);

        Ok(CreatedContainer {
            id,
            warnings: Vec::new(),
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.pause().await;

        let result = {
            let mut state = self.state.lock();
            state.calls.push(RuntimeCall::StartContainer(id.to_string()));
            Self::check(&state, FailPoint::StartContainer).and_then(|()| {
                let container = state
                    .containers
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| RuntimeError::NotFound(format!("No such container: {}", id)))?;
                container.running = true;
                let event = Self::container_event(container, "start", None);
                Self::emit(&state, event, true);
                Ok(())
            })
        };
        self.leave_start_sequence();
        result
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::StopContainer(id.to_string()));
        Self::check(&state, FailPoint::StopContainer)?;
        let container = state
            .containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RuntimeError::NotFound(format!("No such container: {}", id)))?;
        container.running = false;
        let event = Self::container_event(container, "die", Some(0));
        Self::emit(&state, event, true);
        Ok(())
    }

    async fn subscribe_events(&self, filter: &EventFilter) -> Result<EventFeed, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::SubscribeEvents);
        Self::check(&state, FailPoint::Subscribe)?;
        let (tx, rx) = mpsc::unbounded_channel();
        state.feed = Some((filter.clone(), tx));
        state.subscriptions += 1;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_name_conflict_rejected() {
        let runtime = InMemoryRuntime::new().with_container("web1", "nginx", false);
        let spec = CreateContainerSpec {
            name: "web1".into(),
            image: "nginx".into(),
            user: String::new(),
            hostname: "web1".into(),
            working_dir: "/app".into(),
            environment: vec![],
            commands: vec![],
            ports: vec![],
            volumes: vec![],
            restart_policy: Default::default(),
            network_id: "net".into(),
            ip_address: None,
            aliases: vec![],
        };
        assert!(runtime.create_container(&spec).await.is_err());
        assert_eq!(runtime.max_concurrent_starts(), 1);
    }

    #[tokio::test]
    async fn test_feed_applies_filter() {
        let runtime = InMemoryRuntime::new();
        let mut feed = runtime
            .subscribe_events(&EventFilter::container_lifecycle())
            .await
            .unwrap();
        runtime.emit_raw("kill", "c1", &[]);
        runtime.emit_raw("start", "c1", &[]);
        runtime.end_feed();

        let first = feed.next().await.unwrap().unwrap();
        assert_eq!(first.action, "start");
        assert!(feed.next().await.is_none());
    }
}
