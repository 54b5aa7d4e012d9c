//! # Runtime Adapter Service
//!
//! Presents the container runtime as idempotent, name-keyed operations and
//! runs the lifecycle event subscription.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RuntimeAdapterConfig;
use crate::domain::{
    normalize_event, Backoff, ContainerLookup, CreateContainerSpec, EventFilter, NetworkSpec,
    RuntimeError, StartedContainer, StopOutcome, SubscriptionSignal, SubscriptionState,
};
use crate::ports::{ContainerRuntime, EventFeed, RuntimeApi};
use shared_bus::HandoffSender;
use shared_types::{LifecycleEvent, StartContainerParams};

/// Runtime adapter - the only owner of the runtime client.
pub struct RuntimeAdapter {
    runtime: Arc<dyn ContainerRuntime>,
    config: RuntimeAdapterConfig,
}

impl RuntimeAdapter {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: RuntimeAdapterConfig) -> Self {
        Self { runtime, config }
    }

    pub fn config(&self) -> &RuntimeAdapterConfig {
        &self.config
    }

    /// Ensure the network from the adapter's own configuration.
    pub async fn ensure_configured_network(&self) -> Result<String, RuntimeError> {
        self.ensure_network(&self.config.network).await
    }

    /// Find `name` in one listing pass. Listing errors read as absent.
    async fn find_in_listing(&self, name: &str, all: bool) -> Option<String> {
        match self.runtime.list_containers(all).await {
            Ok(containers) => containers
                .into_iter()
                .find(|container| container.name == name)
                .map(|container| container.id),
            Err(e) => {
                debug!(container_name = %name, all, error = %e, "Container listing failed");
                None
            }
        }
    }

    fn build_spec(&self, request: &StartContainerParams) -> CreateContainerSpec {
        CreateContainerSpec {
            name: request.container_name.clone(),
            image: request.image_name.clone(),
            user: request.user.clone(),
            hostname: request.container_name.clone(),
            working_dir: self.config.working_dir.clone(),
            environment: request.environment.clone(),
            commands: request.commands.clone(),
            ports: request.ports.clone(),
            volumes: request.volumes.clone(),
            restart_policy: request.restart_policy,
            network_id: self.config.network.id.clone(),
            ip_address: request.ip_address.clone().filter(|ip| !ip.is_empty()),
            aliases: vec![request.container_name.clone()],
        }
    }
}

#[async_trait]
impl RuntimeApi for RuntimeAdapter {
    async fn ensure_network(&self, network: &NetworkSpec) -> Result<String, RuntimeError> {
        match self.runtime.inspect_network(&network.id).await {
            Ok(id) => {
                debug!(network_id = %id, "Network already present");
                return Ok(id);
            }
            Err(e) => {
                debug!(network_id = %network.id, error = %e, "Network lookup failed, creating");
            }
        }

        self.runtime.create_network(network).await?;
        info!(
            network_id = %network.id,
            subnet = %network.subnet,
            gateway = %network.gateway,
            "Created bridge network"
        );

        match self.runtime.inspect_network(&network.id).await {
            Ok(id) => Ok(id),
            Err(e) => {
                debug!(network_id = %network.id, error = %e, "Post-create inspect failed");
                Ok(network.id.clone())
            }
        }
    }

    async fn image_exists(&self, image_name: &str) -> bool {
        match self.runtime.list_image_tags().await {
            Ok(tags) => tags.iter().any(|tag| tag.starts_with(image_name)),
            Err(e) => {
                warn!(image = %image_name, error = %e, "Image listing failed");
                false
            }
        }
    }

    async fn lookup_container(&self, name: &str) -> ContainerLookup {
        if let Some(id) = self.find_in_listing(name, false).await {
            return ContainerLookup::Running { id };
        }
        match self.find_in_listing(name, true).await {
            Some(id) => ContainerLookup::Stopped { id },
            None => ContainerLookup::NotFound,
        }
    }

    async fn create_and_start(
        &self,
        request: &StartContainerParams,
    ) -> Result<StartedContainer, RuntimeError> {
        if self.config.refresh_images_before_start {
            if let Err(e) = self.pull_image(&request.image_name).await {
                warn!(image = %request.image_name, error = %e, "Image refresh failed, using local copy");
            }
        }

        let spec = self.build_spec(request);
        let created = self.runtime.create_container(&spec).await?;
        debug!(container_name = %spec.name, container_id = %created.id, "Container created");

        if let Err(e) = self.runtime.start_container(&created.id).await {
            warn!(container_id = %created.id, error = %e, "Created container failed to start");
            return Err(RuntimeError::StartFailed {
                container_id: created.id,
                reason: e.to_string(),
            });
        }

        info!(
            container_name = %spec.name,
            container_id = %created.id,
            image = %spec.image,
            "Container started"
        );
        Ok(StartedContainer {
            id: created.id,
            warnings: created.warnings,
        })
    }

    async fn stop_container(&self, name: &str) -> Result<StopOutcome, RuntimeError> {
        match self.lookup_container(name).await {
            ContainerLookup::Running { id } => {
                self.runtime.stop_container(&id).await?;
                info!(container_name = %name, container_id = %id, "Container stopped");
                Ok(StopOutcome {
                    container_id: id,
                    was_running: true,
                })
            }
            ContainerLookup::Stopped { id } => Ok(StopOutcome {
                container_id: id,
                was_running: false,
            }),
            ContainerLookup::NotFound => Err(RuntimeError::ContainerNotFound(name.to_string())),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        self.runtime.pull_image(image).await
    }

    async fn stream_events(&self, sink: HandoffSender<LifecycleEvent>) -> Result<(), RuntimeError> {
        let filter = EventFilter::container_lifecycle();
        let resubscribe = self.config.events.resubscribe;
        let mut backoff = Backoff::new(
            self.config.events.initial_backoff(),
            self.config.events.max_backoff(),
        );
        let mut state = SubscriptionState::Subscribing;
        let mut feed: Option<EventFeed> = None;
        // Backoff resets on the first delivery of each fresh subscription.
        let mut fresh = false;

        loop {
            match state {
                SubscriptionState::Subscribing => {
                    match self.runtime.subscribe_events(&filter).await {
                        Ok(subscription) => {
                            info!("Listening for container events");
                            feed = Some(subscription);
                            fresh = true;
                            state = state.on(SubscriptionSignal::Subscribed);
                        }
                        Err(e) if resubscribe => {
                            warn!(error = %e, "Event subscription failed");
                            state = state.on(SubscriptionSignal::SubscribeFailed);
                        }
                        Err(e) => return Err(e),
                    }
                }
                SubscriptionState::Streaming => {
                    let Some(current) = feed.as_mut() else {
                        state = state.on(SubscriptionSignal::FeedEnded);
                        continue;
                    };
                    let next = tokio::select! {
                        _ = sink.closed() => return Ok(()),
                        next = current.next() => next,
                    };
                    match next {
                        Some(Ok(raw)) => {
                            state = state.on(SubscriptionSignal::Event);
                            let Some(event) = normalize_event(&raw) else {
                                debug!(action = %raw.action, "Dropping unmapped runtime event");
                                continue;
                            };
                            if sink.send(event).await.is_err() {
                                debug!("Event sink closed, stopping subscription");
                                return Ok(());
                            }
                            if fresh {
                                backoff.reset();
                                fresh = false;
                            }
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Error while listening to events");
                            if resubscribe {
                                feed = None;
                                state = state.on(SubscriptionSignal::FeedError);
                            }
                        }
                        None => {
                            if !resubscribe {
                                return Err(RuntimeError::SubscriptionEnded);
                            }
                            warn!("Event feed ended");
                            feed = None;
                            state = state.on(SubscriptionSignal::FeedEnded);
                        }
                    }
                }
                SubscriptionState::Faulted => {
                    let delay = backoff.next_delay();
                    debug!(delay_ms = delay.as_millis() as u64, "Resubscribing after backoff");
                    tokio::select! {
                        _ = sink.closed() => return Ok(()),
                        _ = tokio::time::sleep(delay) => {
                            state = state.on(SubscriptionSignal::BackoffElapsed);
                        }
                    }
                }
            }
        }
    }
}
