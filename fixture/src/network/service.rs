//! Service helper

use tracing::info;

use crate::engine::{ContainerEngine, ServiceSpec};
use crate::error::Result;

use super::{IdSource, Network};

/// A service created on the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Engine ID
    pub id: String,
    pub name: String,
}

impl Service {
    /// Create a service named `service-<id>` running `image`
    ///
    /// The service is attached to `network` when one is given.
    pub async fn create(
        engine: &dyn ContainerEngine,
        ids: &IdSource,
        image: &str,
        network: Option<&Network>,
    ) -> Result<Self> {
        let name = ids
            .next_free_name("service", move |candidate| async move {
                engine.service_exists(&candidate).await
            })
            .await?;

        let spec = ServiceSpec {
            name: name.clone(),
            image: image.to_string(),
            networks: network.map(|n| n.id.clone()).into_iter().collect(),
        };
        let id = engine.create_service(&spec).await?;

        info!(
            service_id = %id,
            name = %name,
            image = %image,
            network = ?network.map(|n| n.name.as_str()),
            "Fixture service created"
        );

        Ok(Self { id, name })
    }

    /// Delete the service from the engine
    pub async fn remove(&self, engine: &dyn ContainerEngine) -> Result<()> {
        engine.remove_service(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::RecordingEngine;
    use crate::engine::MockContainerEngine;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_service_on_network() {
        let engine = RecordingEngine::new();
        let ids = IdSource::starting_at(1000);

        let network = Network::create(&engine, &ids, None).await.unwrap();
        let service = Service::create(&engine, &ids, "docker.io/lib/sim:1.2", Some(&network))
            .await
            .unwrap();

        assert_eq!(service.name, "service-1001");
        assert_eq!(
            engine.service("service-1001").unwrap(),
            ServiceSpec {
                name: "service-1001".to_string(),
                image: "docker.io/lib/sim:1.2".to_string(),
                networks: vec![network.id.clone()],
            }
        );
    }

    #[tokio::test]
    async fn test_create_service_without_network() {
        let engine = RecordingEngine::new();
        let ids = IdSource::starting_at(1000);

        let service = Service::create(&engine, &ids, "sim:latest", None).await.unwrap();
        assert!(engine.service(&service.name).unwrap().networks.is_empty());

        service.remove(&engine).await.unwrap();
        assert!(engine.service(&service.name).is_none());
    }

    #[tokio::test]
    async fn test_service_spec_passed_to_engine() {
        let mut engine = MockContainerEngine::new();
        engine.expect_service_exists().returning(|_| Ok(false));
        engine
            .expect_create_service()
            .withf(|spec| {
                spec.name == "service-7"
                    && spec.image == "sim:1.0"
                    && spec.networks == vec!["net-abc".to_string()]
            })
            .times(1)
            .returning(|_| Ok("svc-1".to_string()));

        let network = Network {
            id: "net-abc".to_string(),
            name: "network-6".to_string(),
        };
        let ids = IdSource::starting_at(7);

        let service = Service::create(&engine, &ids, "sim:1.0", Some(&network))
            .await
            .unwrap();
        assert_eq!(service.id, "svc-1");
    }
}
