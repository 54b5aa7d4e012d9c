//! # Docker Engine Adapter
//!
//! [`ContainerRuntime`] over the Docker Engine API, using `bollard`.

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, NetworkingConfig,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::{CreateImageOptions, ListImagesOptions};
use bollard::models::{
    EndpointIpamConfig, EndpointSettings, EventMessage, HostConfig, Ipam, IpamConfig, Mount,
    MountTypeEnum, PortBinding, RestartPolicy as DockerRestartPolicy, RestartPolicyNameEnum,
};
use bollard::network::{CreateNetworkOptions, InspectNetworkOptions};
use bollard::system::EventsOptions;
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::domain::{
    ContainerSummary, CreateContainerSpec, CreatedContainer, EventFilter, NetworkSpec, RawEvent,
    RuntimeError,
};
use crate::ports::{ContainerRuntime, EventFeed};
use shared_types::RestartPolicy;

impl From<bollard::errors::Error> for RuntimeError {
    fn from(e: bollard::errors::Error) -> Self {
        match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => RuntimeError::NotFound(message),
            bollard::errors::Error::DockerResponseServerError { message, .. } => {
                RuntimeError::Api(message)
            }
            other => RuntimeError::Api(other.to_string()),
        }
    }
}

/// Docker Engine runtime.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect using the environment (`DOCKER_HOST`) or the local socket.
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Connection(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Round-trip to the engine to verify the connection.
    pub async fn ping(&self) -> Result<(), RuntimeError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| RuntimeError::Connection(e.to_string()))
    }
}

fn restart_policy_name(policy: RestartPolicy) -> RestartPolicyNameEnum {
    match policy {
        RestartPolicy::No => RestartPolicyNameEnum::NO,
        RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
        RestartPolicy::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
        RestartPolicy::OnFailure => RestartPolicyNameEnum::ON_FAILURE,
    }
}

/// Translate a create spec into the engine's container config.
fn container_config(spec: &CreateContainerSpec) -> Config<String> {
    let mut exposed_ports = HashMap::new();
    let mut port_bindings = HashMap::new();
    for port in &spec.ports {
        exposed_ports.insert(port.container_port.clone(), HashMap::new());
        port_bindings.insert(
            port.container_port.clone(),
            Some(vec![PortBinding {
                host_ip: None,
                host_port: Some(port.host_port.clone()),
            }]),
        );
    }

    let mounts = spec
        .volumes
        .iter()
        .map(|volume| Mount {
            typ: Some(MountTypeEnum::BIND),
            source: Some(volume.source.clone()),
            target: Some(volume.target.clone()),
            ..Default::default()
        })
        .collect();

    let host_config = HostConfig {
        mounts: Some(mounts),
        auto_remove: Some(false),
        port_bindings: Some(port_bindings),
        restart_policy: Some(DockerRestartPolicy {
            name: Some(restart_policy_name(spec.restart_policy)),
            ..Default::default()
        }),
        network_mode: Some(spec.network_id.clone()),
        ..Default::default()
    };

    let endpoint = EndpointSettings {
        aliases: Some(spec.aliases.clone()),
        network_id: Some(spec.network_id.clone()),
        ipam_config: spec.ip_address.as_ref().map(|ip| EndpointIpamConfig {
            ipv4_address: Some(ip.clone()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
    let optional_list = |values: &[String]| (!values.is_empty()).then(|| values.to_vec());

    Config {
        image: Some(spec.image.clone()),
        hostname: Some(spec.hostname.clone()),
        user: optional(&spec.user),
        working_dir: optional(&spec.working_dir),
        env: optional_list(&spec.environment),
        cmd: optional_list(&spec.commands),
        tty: Some(false),
        attach_stdin: Some(true),
        attach_stdout: Some(true),
        network_disabled: Some(false),
        exposed_ports: Some(exposed_ports),
        host_config: Some(host_config),
        networking_config: Some(NetworkingConfig {
            endpoints_config: HashMap::from([(spec.network_id.clone(), endpoint)]),
        }),
        ..Default::default()
    }
}

fn raw_event(message: EventMessage) -> RawEvent {
    let (actor_id, attributes) = match message.actor {
        Some(actor) => (actor.id, actor.attributes.unwrap_or_default()),
        None => (None, HashMap::new()),
    };
    RawEvent {
        kind: message.typ.map(|t| t.to_string()).unwrap_or_default(),
        action: message.action.unwrap_or_default(),
        actor_id,
        attributes,
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn inspect_network(&self, id: &str) -> Result<String, RuntimeError> {
        let network = self
            .docker
            .inspect_network(id, None::<InspectNetworkOptions<String>>)
            .await?;
        Ok(network.id.unwrap_or_else(|| id.to_string()))
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<(), RuntimeError> {
        let options = CreateNetworkOptions {
            name: spec.id.clone(),
            driver: "bridge".to_string(),
            ipam: Ipam {
                config: Some(vec![IpamConfig {
                    subnet: Some(spec.subnet.clone()),
                    gateway: Some(spec.gateway.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            ..Default::default()
        };
        self.docker.create_network(options).await?;
        Ok(())
    }

    async fn list_image_tags(&self) -> Result<Vec<String>, RuntimeError> {
        let images = self
            .docker
            .list_images(Some(ListImagesOptions::<String> {
                ..Default::default()
            }))
            .await?;
        Ok(images
            .into_iter()
            .flat_map(|image| image.repo_tags)
            .collect())
    }

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };
        let mut progress = self.docker.create_image(Some(options), None, None);
        while let Some(step) = progress.next().await {
            let info = step?;
            trace!(image = %image, status = ?info.status, "Pull progress");
        }
        debug!(image = %image, "Image pulled");
        Ok(())
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all,
                ..Default::default()
            }))
            .await?;
        Ok(containers
            .into_iter()
            .filter_map(|container| {
                let id = container.id?;
                let name = container.names?.into_iter().next()?;
                Some(ContainerSummary {
                    id,
                    name: name.trim_start_matches('/').to_string(),
                })
            })
            .collect())
    }

    async fn create_container(
        &self,
        spec: &CreateContainerSpec,
    ) -> Result<CreatedContainer, RuntimeError> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };
        let response = self
            .docker
            .create_container(Some(options), container_config(spec))
            .await?;
        Ok(CreatedContainer {
            id: response.id,
            warnings: response.warnings,
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.docker
            .stop_container(id, None::<StopContainerOptions>)
            .await?;
        Ok(())
    }

    async fn subscribe_events(&self, filter: &EventFilter) -> Result<EventFeed, RuntimeError> {
        let filters = HashMap::from([
            ("type".to_string(), filter.types.clone()),
            ("event".to_string(), filter.actions.clone()),
        ]);
        let stream = self.docker.events(Some(EventsOptions::<String> {
            filters,
            ..Default::default()
        }));
        Ok(stream
            .map(|item| item.map(raw_event).map_err(RuntimeError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{EventActor, EventMessageTypeEnum};

    fn spec() -> CreateContainerSpec {
        CreateContainerSpec {
            name: "web1".into(),
            image: "nginx".into(),
            user: String::new(),
            hostname: "web1".into(),
            working_dir: "/app".into(),
            environment: vec!["A=1".into()],
            commands: vec![],
            ports: vec!["80/tcp:8080".parse().unwrap()],
            volumes: vec!["/srv:/data".parse().unwrap()],
            restart_policy: RestartPolicy::UnlessStopped,
            network_id: "mdb-net".into(),
            ip_address: None,
            aliases: vec!["web1".into()],
        }
    }

    #[test]
    fn test_container_config_translation() {
        let config = container_config(&spec());
        assert_eq!(config.working_dir.as_deref(), Some("/app"));
        assert_eq!(config.hostname.as_deref(), Some("web1"));
        assert!(config.user.is_none());
        assert!(config.cmd.is_none());

        let host = config.host_config.unwrap();
        let bindings = host.port_bindings.unwrap();
        let binding = bindings["80/tcp"].as_ref().unwrap();
        assert_eq!(binding[0].host_port.as_deref(), Some("8080"));
        assert_eq!(host.network_mode.as_deref(), Some("mdb-net"));
        assert_eq!(
            host.restart_policy.unwrap().name,
            Some(RestartPolicyNameEnum::UNLESS_STOPPED)
        );
        let mounts = host.mounts.unwrap();
        assert_eq!(mounts[0].source.as_deref(), Some("/srv"));
        assert_eq!(mounts[0].typ, Some(MountTypeEnum::BIND));

        let endpoints = config.networking_config.unwrap().endpoints_config;
        let endpoint = &endpoints["mdb-net"];
        assert_eq!(endpoint.aliases, Some(vec!["web1".to_string()]));
        assert!(endpoint.ipam_config.is_none());
    }

    #[test]
    fn test_fixed_ip_sets_ipam() {
        let mut spec = spec();
        spec.ip_address = Some("172.30.0.9".into());
        let endpoints = container_config(&spec).networking_config.unwrap().endpoints_config;
        let ipam = endpoints["mdb-net"].ipam_config.clone().unwrap();
        assert_eq!(ipam.ipv4_address.as_deref(), Some("172.30.0.9"));
    }

    #[test]
    fn test_raw_event_translation() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("die".into()),
            actor: Some(EventActor {
                id: Some("c1".into()),
                attributes: Some(HashMap::from([("exitCode".to_string(), "1".to_string())])),
            }),
            ..Default::default()
        };
        let raw = raw_event(message);
        assert_eq!(raw.kind, "container");
        assert_eq!(raw.action, "die");
        assert_eq!(raw.actor_id.as_deref(), Some("c1"));
        assert_eq!(raw.attributes["exitCode"], "1");
    }

    #[test]
    fn test_not_found_maps() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "network mdb-net not found".into(),
        };
        assert!(matches!(RuntimeError::from(err), RuntimeError::NotFound(_)));
    }
}
