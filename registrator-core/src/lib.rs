//! # Registrator Core
//!
//! Reconciles running service instances against a directory of declared services
//! held in a key-value store, and records or removes one entry per instance.
//!
//! ## Modules
//! - `naming`: Service name resolution and store path layout.
//! - `catalog`: Immutable snapshot of declared services, loaded once.
//! - `store`: Key-value backends (etcd, in-memory) behind one trait.
//! - `controller`: Register / Deregister / Refresh / Ping.
//! - `factory`: Builds a controller from a connection URI.

pub mod catalog;
pub mod controller;
pub mod factory;
pub mod naming;
pub mod store;

pub use catalog::ServiceCatalog;
pub use controller::{RegistrationController, ResolvedInstance};
pub use factory::{factory_for, parse_uri, AdapterOptions, CatalogAdapterFactory};
pub use naming::PathNamer;
pub use store::RegistryClient;
