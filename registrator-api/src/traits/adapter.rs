use async_trait::async_trait;

use crate::error::Result;
use crate::model::instance::ServiceInstance;

/// The surface a host runtime drives for every instance lifecycle event.
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Checks that the backend behind the adapter is reachable.
    async fn ping(&self) -> Result<()>;

    /// Records the instance under its service.
    ///
    /// # Returns
    ///
    /// * `Err(RegistryError::ServiceNotRegistered)` - The service was never declared. Nothing is written.
    /// * `Err(..)` - The backend failed. The host is expected to retry on its own schedule.
    async fn register(&self, instance: &ServiceInstance) -> Result<()>;

    /// Removes the instance. Removing something that is already gone is a success.
    async fn deregister(&self, instance: &ServiceInstance) -> Result<()>;

    /// Re-asserts the instance and restarts its TTL. Same contract as [`RegistryAdapter::register`].
    async fn refresh(&self, instance: &ServiceInstance) -> Result<()>;
}

#[async_trait]
impl RegistryAdapter for Box<dyn RegistryAdapter> {
    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }

    async fn register(&self, instance: &ServiceInstance) -> Result<()> {
        (**self).register(instance).await
    }

    async fn deregister(&self, instance: &ServiceInstance) -> Result<()> {
        (**self).deregister(instance).await
    }

    async fn refresh(&self, instance: &ServiceInstance) -> Result<()> {
        (**self).refresh(instance).await
    }
}
