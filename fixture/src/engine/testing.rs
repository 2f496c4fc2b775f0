//! In-memory engine that records every call

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{FixtureError, ResourceKind, Result};

use super::{ContainerEngine, ContainerHandle, NetworkSpec, ServiceSpec};

#[derive(Clone, Default)]
pub(crate) struct RecordingEngine {
    inner: Arc<RecordingEngineInner>,
}

#[derive(Default)]
struct RecordingEngineInner {
    operations: Mutex<Vec<String>>,
    images: Mutex<HashSet<String>>,
    /// name -> (id, running)
    containers: Mutex<HashMap<String, (String, bool)>>,
    networks: Mutex<HashMap<String, NetworkSpec>>,
    services: Mutex<HashMap<String, ServiceSpec>>,
    failing: Mutex<HashSet<&'static str>>,
    next_id: AtomicUsize,
}

impl RecordingEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `op` fail with an engine error
    pub(crate) fn fail_on(&self, op: &'static str) {
        self.inner.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn operations(&self) -> Vec<String> {
        self.inner.operations.lock().unwrap().clone()
    }

    pub(crate) fn has_image(&self, image_ref: &str) -> bool {
        self.inner.images.lock().unwrap().contains(image_ref)
    }

    pub(crate) fn is_running(&self, name: &str) -> bool {
        self.inner
            .containers
            .lock()
            .unwrap()
            .get(name)
            .map(|(_, running)| *running)
            .unwrap_or(false)
    }

    pub(crate) fn has_container(&self, name: &str) -> bool {
        self.inner.containers.lock().unwrap().contains_key(name)
    }

    pub(crate) fn network(&self, name: &str) -> Option<NetworkSpec> {
        self.inner.networks.lock().unwrap().get(name).cloned()
    }

    pub(crate) fn service(&self, name: &str) -> Option<ServiceSpec> {
        self.inner.services.lock().unwrap().get(name).cloned()
    }

    /// Pretend a network already exists on the engine
    pub(crate) fn seed_network(&self, name: &str) {
        self.inner.networks.lock().unwrap().insert(
            name.to_string(),
            NetworkSpec {
                name: name.to_string(),
                driver: super::BRIDGE_DRIVER.to_string(),
                ipam: None,
            },
        );
    }

    fn record(&self, op: &'static str, arg: &str) -> Result<()> {
        self.inner
            .operations
            .lock()
            .unwrap()
            .push(format!("{op}:{arg}"));

        if self.inner.failing.lock().unwrap().contains(op) {
            return Err(FixtureError::Engine(
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 500,
                    message: format!("{op} failed"),
                },
            ));
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let idx = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{idx}")
    }
}

#[async_trait]
impl ContainerEngine for RecordingEngine {
    async fn pull_image(&self, image_ref: &str) -> Result<()> {
        self.record("pull", image_ref)?;
        self.inner.images.lock().unwrap().insert(image_ref.to_string());
        Ok(())
    }

    async fn run_container(&self, image_ref: &str, name: &str) -> Result<String> {
        self.record("run", name)?;
        if !self.has_image(image_ref) {
            return Err(FixtureError::not_found(ResourceKind::Image, image_ref));
        }

        let mut containers = self.inner.containers.lock().unwrap();
        if containers.contains_key(name) {
            return Err(FixtureError::Engine(
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 409,
                    message: format!("container name {name} already in use"),
                },
            ));
        }
        let id = self.next_id("container");
        containers.insert(name.to_string(), (id.clone(), true));
        Ok(id)
    }

    async fn find_container(&self, name: &str) -> Result<ContainerHandle> {
        self.record("find", name)?;
        self.inner
            .containers
            .lock()
            .unwrap()
            .get(name)
            .map(|(id, _)| ContainerHandle {
                id: id.clone(),
                name: name.to_string(),
            })
            .ok_or_else(|| FixtureError::not_found(ResourceKind::Container, name))
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        self.record("stop", id)?;
        let mut containers = self.inner.containers.lock().unwrap();
        let entry = containers
            .values_mut()
            .find(|(cid, _)| cid == id)
            .ok_or_else(|| FixtureError::not_found(ResourceKind::Container, id))?;
        entry.1 = false;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.record("remove", id)?;
        let mut containers = self.inner.containers.lock().unwrap();
        let before = containers.len();
        containers.retain(|_, (cid, _)| cid != id);
        if containers.len() == before {
            return Err(FixtureError::not_found(ResourceKind::Container, id));
        }
        Ok(())
    }

    async fn remove_image(&self, image_ref: &str) -> Result<()> {
        self.record("remove_image", image_ref)?;
        if !self.inner.images.lock().unwrap().remove(image_ref) {
            return Err(FixtureError::not_found(ResourceKind::Image, image_ref));
        }
        Ok(())
    }

    async fn network_exists(&self, name: &str) -> Result<bool> {
        self.record("network_exists", name)?;
        Ok(self.inner.networks.lock().unwrap().contains_key(name))
    }

    async fn create_network(&self, spec: &NetworkSpec) -> Result<String> {
        self.record("create_network", &spec.name)?;
        self.inner
            .networks
            .lock()
            .unwrap()
            .insert(spec.name.clone(), spec.clone());
        Ok(format!("id-{}", spec.name))
    }

    async fn remove_network(&self, id: &str) -> Result<()> {
        self.record("remove_network", id)?;
        let name = id.trim_start_matches("id-");
        self.inner
            .networks
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| FixtureError::not_found(ResourceKind::Network, id))
    }

    async fn service_exists(&self, name: &str) -> Result<bool> {
        self.record("service_exists", name)?;
        Ok(self.inner.services.lock().unwrap().contains_key(name))
    }

    async fn create_service(&self, spec: &ServiceSpec) -> Result<String> {
        self.record("create_service", &spec.name)?;
        self.inner
            .services
            .lock()
            .unwrap()
            .insert(spec.name.clone(), spec.clone());
        Ok(format!("id-{}", spec.name))
    }

    async fn remove_service(&self, id: &str) -> Result<()> {
        self.record("remove_service", id)?;
        let name = id.trim_start_matches("id-");
        self.inner
            .services
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| FixtureError::not_found(ResourceKind::Service, id))
    }
}
