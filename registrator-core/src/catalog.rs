//! Snapshot of the services declared in the store.
//!
//! The catalog is loaded once when an adapter is built and never mutated afterwards.
//! It only serves image lookups during name resolution; whether a service is declared
//! is always asked of the store itself.

use crate::naming::PathNamer;
use crate::store::RegistryClient;
use log::{debug, info};
use registrator::{DeclaredService, RegistryError, Result};
use std::collections::{BTreeMap, HashMap};

/// Declared services keyed by name, with an image index.
#[derive(Debug, Default, Clone)]
pub struct ServiceCatalog {
    /// Maps service name -> declaration.
    services: BTreeMap<String, DeclaredService>,
    /// Maps image -> service name. The first service in name order wins.
    by_image: HashMap<String, String>,
}

impl ServiceCatalog {
    /// Builds a catalog from already decoded declarations.
    pub fn from_services(services: impl IntoIterator<Item = DeclaredService>) -> Self {
        let services: BTreeMap<String, DeclaredService> = services
            .into_iter()
            .map(|service| (service.get_service_name().to_string(), service))
            .collect();

        let mut by_image = HashMap::new();
        for (name, service) in &services {
            if service.get_image().is_empty() {
                continue;
            }
            by_image
                .entry(service.get_image().to_string())
                .or_insert_with(|| name.clone());
        }

        Self { services, by_image }
    }

    /// Reads every `_details` document under the namer's root.
    ///
    /// Keys that are not service declarations (instance records) are skipped.
    ///
    /// # Returns
    ///
    /// * `Err(RegistryError::CatalogCorrupt)` - A declaration is not valid JSON. The
    ///   catalog must be consistent before any registration traffic is served.
    /// * `Err(..)` - The store could not be listed.
    pub async fn load(store: &dyn RegistryClient, namer: &PathNamer) -> Result<Self> {
        let entries = store.list(&namer.root_prefix()).await?;

        let mut services = Vec::new();
        for (key, value) in &entries {
            let Some(name) = namer.parse_details_key(key) else {
                continue;
            };
            let service = DeclaredService::from_json(name, value).map_err(|source| {
                RegistryError::CatalogCorrupt {
                    key: key.clone(),
                    source,
                }
            })?;
            debug!(
                "Catalog: Declared service '{}' (image '{}')",
                name,
                service.get_image()
            );
            services.push(service);
        }

        let catalog = Self::from_services(services);
        info!(
            "Catalog: Loaded {} declared services under {}",
            catalog.len(),
            namer.get_root()
        );
        Ok(catalog)
    }

    /// The declared service expected to run `image`, if any.
    pub fn find_by_image(&self, image: &str) -> Option<&DeclaredService> {
        self.by_image
            .get(image)
            .and_then(|name| self.services.get(name))
    }

    pub fn get(&self, service_name: &str) -> Option<&DeclaredService> {
        self.services.get(service_name)
    }

    pub fn contains(&self, service_name: &str) -> bool {
        self.services.contains_key(service_name)
    }

    /// All declarations, in service name order.
    pub fn iter(&self) -> impl Iterator<Item = &DeclaredService> {
        self.services.values()
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
