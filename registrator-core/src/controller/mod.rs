//! Drives Register / Deregister / Refresh for single instances.
//!
//! An instance is either absent or present under its instance path; that state lives
//! only in the store. The controller holds nothing mutable of its own, so calls for
//! different instances can run concurrently.

use crate::catalog::ServiceCatalog;
use crate::naming::PathNamer;
use crate::store::RegistryClient;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use registrator::{RegistrationRecord, RegistryAdapter, RegistryError, Result, ServiceInstance};
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Where an instance lands in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstance {
    pub service: String,
    pub service_path: String,
    pub instance_path: String,
}

/// The registry adapter: catalog-aware naming on top of a key-value store.
pub struct RegistrationController {
    store: Arc<dyn RegistryClient>,
    catalog: Arc<ServiceCatalog>,
    namer: PathNamer,
}

impl RegistrationController {
    /// Creates a controller over an already loaded catalog.
    pub fn new(
        store: Arc<dyn RegistryClient>,
        catalog: Arc<ServiceCatalog>,
        namer: PathNamer,
    ) -> Self {
        Self {
            store,
            catalog,
            namer,
        }
    }

    /// Loads the catalog from `store` and creates a controller over it.
    ///
    /// A corrupt declaration aborts construction with [`RegistryError::CatalogCorrupt`].
    pub async fn load(store: Arc<dyn RegistryClient>, namer: PathNamer) -> Result<Self> {
        let catalog = ServiceCatalog::load(store.as_ref(), &namer).await?;
        Ok(Self::new(store, Arc::new(catalog), namer))
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn namer(&self) -> &PathNamer {
        &self.namer
    }

    /// Computes the service and paths an instance maps to, without touching the store.
    pub fn resolve(&self, instance: &ServiceInstance) -> ResolvedInstance {
        let service = self.namer.resolve_service_name(instance, &self.catalog);
        ResolvedInstance {
            service_path: self.namer.service_path(&service),
            instance_path: self.namer.instance_path(&service, &instance.id),
            service,
        }
    }

    /// Whether the service has a `_details` declaration in the store.
    async fn is_declared(&self, service: &str) -> Result<bool> {
        let path = self.namer.details_path(service);
        self.store.exists(&path).await
    }
}

#[async_trait]
impl RegistryAdapter for RegistrationController {
    async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    async fn register(&self, instance: &ServiceInstance) -> Result<()> {
        let resolved = self.resolve(instance);

        match self.is_declared(&resolved.service).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    "Registrator: service not registered: {} (instance {})",
                    resolved.service, instance.id
                );
                return Err(RegistryError::ServiceNotRegistered(resolved.service));
            }
            Err(e) => {
                error!(
                    "Registrator: failed to check service {}: {}",
                    resolved.service, e
                );
                return Err(e);
            }
        }

        let record = RegistrationRecord::new(instance.ip.as_str(), instance.port).to_json()?;
        if let Err(e) = self
            .store
            .set_with_ttl(&resolved.instance_path, &record, instance.ttl)
            .await
        {
            error!(
                "Registrator: failed to register {}: {}",
                resolved.instance_path, e
            );
            return Err(e);
        }

        info!(
            "Registrator: registered {} -> {}:{} (ttl {:?})",
            resolved.instance_path, instance.ip, instance.port, instance.ttl
        );
        Ok(())
    }

    async fn deregister(&self, instance: &ServiceInstance) -> Result<()> {
        let resolved = self.resolve(instance);

        match self.is_declared(&resolved.service).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    "Registrator: service {} not declared, nothing to deregister for {}",
                    resolved.service, instance.id
                );
                return Ok(());
            }
            Err(e) => {
                error!(
                    "Registrator: failed to check service {}: {}",
                    resolved.service, e
                );
                return Err(e);
            }
        }

        if let Err(e) = self.store.delete(&resolved.instance_path).await {
            error!(
                "Registrator: failed to deregister {}: {}",
                resolved.instance_path, e
            );
            return Err(e);
        }

        info!("Registrator: deregistered {}", resolved.instance_path);
        Ok(())
    }

    async fn refresh(&self, instance: &ServiceInstance) -> Result<()> {
        self.register(instance).await
    }
}
