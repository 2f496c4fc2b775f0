//! bollard-backed engine

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::{CreateImageOptions, RemoveImageOptions};
use bollard::models::{
    Ipam, IpamConfig, NetworkAttachmentConfig, ServiceSpec as EngineServiceSpec, TaskSpec,
    TaskSpecContainerSpec,
};
use bollard::network::{CreateNetworkOptions, InspectNetworkOptions};
use bollard::service::InspectServiceOptions;
use bollard::Docker;
use futures::TryStreamExt;
use tracing::{debug, info};

use crate::error::{FixtureError, ResourceKind, Result};
use crate::metrics;

use super::{ContainerEngine, ContainerHandle, NetworkSpec, ServiceSpec};

/// Connection timeout for explicit sockets, in seconds
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Docker/Podman engine reached through the bollard API client
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connect to the engine, using local defaults when no socket is given
    pub fn connect(socket: Option<&str>) -> Result<Self> {
        let docker = match socket {
            Some(addr) if addr.starts_with("tcp://") || addr.starts_with("http://") => {
                Docker::connect_with_http(addr, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)?
            }
            #[cfg(unix)]
            Some(path) => {
                Docker::connect_with_unix(path, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)?
            }
            #[cfg(not(unix))]
            Some(_) => Docker::connect_with_local_defaults()?,
            None => Docker::connect_with_local_defaults()?,
        };

        debug!(socket = ?socket, "Connected to container engine");
        Ok(Self { docker })
    }
}

/// Count the call and its failure, if any
fn track<T>(op: &'static str, result: Result<T>) -> Result<T> {
    metrics::record_engine_call(op);
    if let Err(ref err) = result {
        metrics::record_engine_error(op, err.kind_label());
    }
    result
}

/// Bridge the fixture's network spec to bollard create options
fn create_network_options(spec: &NetworkSpec) -> CreateNetworkOptions<String> {
    let ipam = match &spec.ipam {
        Some(pool) => Ipam {
            driver: Some("default".to_string()),
            config: Some(vec![IpamConfig {
                subnet: pool.subnet.clone(),
                gateway: pool.gateway.clone(),
                ..Default::default()
            }]),
            ..Default::default()
        },
        None => Ipam::default(),
    };

    CreateNetworkOptions {
        name: spec.name.clone(),
        driver: spec.driver.clone(),
        ipam,
        ..Default::default()
    }
}

/// Bridge the fixture's service spec to the engine's service spec
fn engine_service_spec(spec: &ServiceSpec) -> EngineServiceSpec {
    let networks = spec
        .networks
        .iter()
        .map(|target| NetworkAttachmentConfig {
            target: Some(target.clone()),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    EngineServiceSpec {
        name: Some(spec.name.clone()),
        task_template: Some(TaskSpec {
            container_spec: Some(TaskSpecContainerSpec {
                image: Some(spec.image.clone()),
                ..Default::default()
            }),
            networks: if networks.is_empty() { None } else { Some(networks) },
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn pull_image(&self, image_ref: &str) -> Result<()> {
        let options = CreateImageOptions {
            from_image: image_ref.to_string(),
            ..Default::default()
        };

        let result = self
            .docker
            .create_image(Some(options), None, None)
            .try_collect::<Vec<_>>()
            .await
            .map_err(FixtureError::from);
        let progress = track("pull_image", result)?;

        info!(image = %image_ref, events = progress.len(), "Image pulled");
        Ok(())
    }

    async fn run_container(&self, image_ref: &str, name: &str) -> Result<String> {
        let options = CreateContainerOptions {
            name: name.to_string(),
            platform: None,
        };
        let config = Config {
            image: Some(image_ref.to_string()),
            ..Default::default()
        };

        let result = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(FixtureError::from);
        let created = track("create_container", result)?;

        let result = self
            .docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(FixtureError::from);
        track("start_container", result)?;

        info!(container_id = %created.id, name = %name, image = %image_ref, "Container started");
        Ok(created.id)
    }

    async fn find_container(&self, name: &str) -> Result<ContainerHandle> {
        let result = self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Container, name));
        let inspected = track("inspect_container", result)?;

        let id = inspected
            .id
            .ok_or_else(|| FixtureError::not_found(ResourceKind::Container, name))?;

        Ok(ContainerHandle {
            id,
            name: name.to_string(),
        })
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        let result = self
            .docker
            .stop_container(id, None::<StopContainerOptions>)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Container, id));
        track("stop_container", result)?;

        info!(container_id = %id, "Container stopped");
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        let result = self
            .docker
            .remove_container(id, None::<RemoveContainerOptions>)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Container, id));
        track("remove_container", result)?;

        info!(container_id = %id, "Container removed");
        Ok(())
    }

    async fn remove_image(&self, image_ref: &str) -> Result<()> {
        let result = self
            .docker
            .remove_image(image_ref, None::<RemoveImageOptions>, None)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Image, image_ref));
        let deleted = track("remove_image", result)?;

        info!(image = %image_ref, layers = deleted.len(), "Image removed");
        Ok(())
    }

    async fn network_exists(&self, name: &str) -> Result<bool> {
        let result = self
            .docker
            .inspect_network(name, None::<InspectNetworkOptions<String>>)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Network, name));

        match track("inspect_network", result) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<String> {
        let options = create_network_options(spec);

        let result = self
            .docker
            .create_network(options)
            .await
            .map_err(FixtureError::from);
        let created = track("create_network", result)?;

        let id = created.id.unwrap_or_else(|| spec.name.clone());
        info!(network_id = %id, name = %spec.name, driver = %spec.driver, "Network created");
        Ok(id)
    }

    async fn remove_network(&self, id: &str) -> Result<()> {
        let result = self
            .docker
            .remove_network(id)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Network, id));
        track("remove_network", result)?;

        info!(network_id = %id, "Network removed");
        Ok(())
    }

    async fn service_exists(&self, name: &str) -> Result<bool> {
        let result = self
            .docker
            .inspect_service(name, None::<InspectServiceOptions>)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Service, name));

        match track("inspect_service", result) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn create_service(&self, spec: &ServiceSpec) -> Result<String> {
        let service = engine_service_spec(spec);

        let result = self
            .docker
            .create_service(service, None)
            .await
            .map_err(FixtureError::from);
        let created = track("create_service", result)?;

        let id = created.id.unwrap_or_else(|| spec.name.clone());
        info!(service_id = %id, name = %spec.name, image = %spec.image, "Service created");
        Ok(id)
    }

    async fn remove_service(&self, id: &str) -> Result<()> {
        let result = self
            .docker
            .delete_service(id)
            .await
            .map_err(|e| FixtureError::from_engine(e, ResourceKind::Service, id));
        track("remove_service", result)?;

        info!(service_id = %id, "Service removed");
        Ok(())
    }
}
