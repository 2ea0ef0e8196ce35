//! The runtime facts about a running service instance, as handed over by the host.

use std::time::Duration;

/// One ephemeral running unit of a service.
///
/// `name` may carry a synthetic `-<origin_exposed_port>` suffix added upstream to
/// disambiguate container names; it is stripped again during name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    /// Raw instance name, possibly suffixed with the exposed port.
    pub name: String,
    /// Opaque instance identifier, unique within a service.
    pub id: String,
    /// Address the instance is reachable on.
    pub ip: String,
    /// Port the instance is reachable on.
    pub port: u16,
    /// How long the registration stays alive without a refresh.
    pub ttl: Duration,
    /// The container port this instance was exposed from (e.g. "8080").
    pub origin_exposed_port: String,
}

impl ServiceInstance {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        ip: impl Into<String>,
        port: u16,
        ttl: Duration,
        origin_exposed_port: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            ip: ip.into(),
            port,
            ttl,
            origin_exposed_port: origin_exposed_port.into(),
        }
    }
}
