//! Key-value backends the registration state lives in.
//!
//! Every operation touches only the key it names. Nothing here retries; retry policy
//! belongs to the transport underneath or to the host above.

use async_trait::async_trait;
use registrator::Result;
use std::time::Duration;

pub mod etcd;
pub mod memory;

pub use etcd::EtcdStore;
pub use memory::{MemoryStore, StoreCall};

/// Abstraction over the key-value store.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Checks backend connectivity.
    async fn ping(&self) -> Result<()>;

    /// Reads a single key.
    async fn get(&self, path: &str) -> Result<Option<String>>;

    /// Reads every key starting with `prefix`, as `(key, value)` pairs in key order.
    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>>;

    /// Whether a key currently exists.
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.get(path).await?.is_some())
    }

    /// Writes a key that the store expires after `ttl`. A zero `ttl` never expires.
    async fn set_with_ttl(&self, path: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Deletes a key. Deleting an absent key succeeds.
    async fn delete(&self, path: &str) -> Result<()>;
}
