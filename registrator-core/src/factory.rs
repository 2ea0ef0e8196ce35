//! Builds adapters from connection URIs.
//!
//! A host picks a factory by the URI scheme with [`factory_for`] and hands the whole
//! URI to it. The URI host, when present, names the etcd endpoint.

use crate::controller::RegistrationController;
use crate::naming::{PathNamer, DEFAULT_SERVICES_ROOT};
use crate::store::EtcdStore;
use async_trait::async_trait;
use log::info;
use registrator::{AdapterFactory, RegistryAdapter, RegistryError, Result};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Scheme the catalog adapter is published under.
pub const SCHEME: &str = "etcdcatalog";

/// Shorter alias accepted for [`SCHEME`].
pub const SCHEME_ALIAS: &str = "etcd";

/// Library-level settings for building an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Root of the services namespace in the store.
    pub services_root: String,
    /// Timeout for connecting and for every store request.
    pub connect_timeout: Duration,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            services_root: DEFAULT_SERVICES_ROOT.to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Factory for the catalog-aware etcd adapter.
#[derive(Debug, Clone, Default)]
pub struct CatalogAdapterFactory {
    options: AdapterOptions,
}

impl CatalogAdapterFactory {
    pub fn new(options: AdapterOptions) -> Self {
        Self { options }
    }

    /// Store endpoints designated by the URI: `http://<host>[:port]`, or none when the
    /// URI has no host so the backend default applies.
    pub fn endpoints(uri: &Url) -> Vec<String> {
        match uri.host_str() {
            Some(host) if !host.is_empty() => match uri.port() {
                Some(port) => vec![format!("http://{}:{}", host, port)],
                None => vec![format!("http://{}", host)],
            },
            _ => Vec::new(),
        }
    }

    /// Connects to the store, loads the catalog and returns the concrete controller.
    pub async fn connect(&self, uri: &Url) -> Result<RegistrationController> {
        let endpoints = Self::endpoints(uri);
        let store = EtcdStore::connect(endpoints, self.options.connect_timeout).await?;
        let endpoints = store.get_endpoints().join(",");
        let controller = RegistrationController::load(
            Arc::new(store),
            PathNamer::new(&self.options.services_root),
        )
        .await?;

        info!(
            "Factory: Adapter ready for {} via {} ({} declared services)",
            uri,
            endpoints,
            controller.catalog().len()
        );
        Ok(controller)
    }
}

#[async_trait]
impl AdapterFactory for CatalogAdapterFactory {
    fn scheme(&self) -> &str {
        SCHEME
    }

    async fn new_adapter(&self, uri: &Url) -> Result<Box<dyn RegistryAdapter>> {
        let controller = self.connect(uri).await?;
        Ok(Box::new(controller))
    }
}

/// Looks up the adapter factory published under `scheme`.
pub fn factory_for(scheme: &str, options: AdapterOptions) -> Result<Box<dyn AdapterFactory>> {
    match scheme {
        SCHEME | SCHEME_ALIAS => Ok(Box::new(CatalogAdapterFactory::new(options))),
        other => Err(RegistryError::UnknownScheme(other.to_string())),
    }
}

/// Parses a connection URI, reporting failures as [`RegistryError::InvalidUri`].
pub fn parse_uri(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|e| RegistryError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })
}
