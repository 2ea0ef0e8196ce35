use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::traits::adapter::RegistryAdapter;

/// Constructs adapters from a connection URI.
///
/// This is the only seam between a host and an adapter implementation: the host
/// picks a factory by URI scheme and hands over the full URI.
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    /// The URI scheme this factory answers to.
    fn scheme(&self) -> &str;

    /// Builds a ready-to-use adapter.
    ///
    /// Fails when the backend cannot be reached or when the state it holds is not
    /// safe to operate on.
    async fn new_adapter(&self, uri: &Url) -> Result<Box<dyn RegistryAdapter>>;
}
