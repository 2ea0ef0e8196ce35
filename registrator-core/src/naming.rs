//! Maps instances onto the store's hierarchical namespace.
//!
//! Layout under the services root:
//!
//! ```text
//! <root>/<service>/_details      declared service document
//! <root>/<service>/<instance-id> registration record, written with a TTL
//! ```

use crate::catalog::ServiceCatalog;
use registrator::ServiceInstance;

/// Default namespace root shared with the other readers of the catalog.
pub const DEFAULT_SERVICES_ROOT: &str = "/weave/service";

/// Key, relative to a service path, holding the service declaration.
pub const DETAILS_KEY: &str = "_details";

/// Computes service and instance paths under a fixed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNamer {
    /// Root without trailing separator.
    root: String,
}

impl Default for PathNamer {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICES_ROOT)
    }
}

impl PathNamer {
    /// Creates a namer rooted at `root`. Trailing separators are ignored.
    pub fn new(root: &str) -> Self {
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    pub fn get_root(&self) -> &str {
        &self.root
    }

    /// The prefix every key of the namespace starts with (`<root>/`).
    pub fn root_prefix(&self) -> String {
        format!("{}/", self.root)
    }

    /// Resolves the logical service an instance belongs to.
    ///
    /// The `-<exposed port>` suffix is stripped first; the remaining base name is then
    /// replaced by the name of the declared service whose image it equals, if any.
    pub fn resolve_service_name(
        &self,
        instance: &ServiceInstance,
        catalog: &ServiceCatalog,
    ) -> String {
        let base = Self::base_name(instance);
        match catalog.find_by_image(base) {
            Some(service) => service.get_service_name().to_string(),
            None => base.to_string(),
        }
    }

    /// Instance name without the synthetic exposed-port suffix.
    pub fn base_name(instance: &ServiceInstance) -> &str {
        instance
            .name
            .strip_suffix(instance.origin_exposed_port.as_str())
            .and_then(|rest| rest.strip_suffix('-'))
            .unwrap_or(instance.name.as_str())
    }

    /// `<root>/<service>/`
    pub fn service_path(&self, service: &str) -> String {
        format!("{}/{}/", self.root, service)
    }

    /// `<root>/<service>/_details`
    pub fn details_path(&self, service: &str) -> String {
        self.service_path(service) + DETAILS_KEY
    }

    /// `<root>/<service>/<instance id>`
    pub fn instance_path(&self, service: &str, instance_id: &str) -> String {
        self.service_path(service) + instance_id
    }

    /// Extracts the service name from a `_details` key, or `None` for any other key.
    pub fn parse_details_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        let relative = key.strip_prefix(self.root.as_str())?.strip_prefix('/')?;
        let service = relative.strip_suffix(DETAILS_KEY)?.strip_suffix('/')?;
        if service.is_empty() || service.contains('/') {
            return None;
        }
        Some(service)
    }
}
