pub mod error;
pub mod model;
pub mod traits;

pub use error::{RegistryError, Result, StoreOperation};
pub use model::instance::ServiceInstance;
pub use model::record::RegistrationRecord;
pub use model::service::{DeclaredService, ServiceDetails};
pub use traits::adapter::RegistryAdapter;
pub use traits::factory::AdapterFactory;

pub mod prelude {
    pub use crate::error::{RegistryError, Result};
    pub use crate::model::instance::ServiceInstance;
    pub use crate::traits::adapter::RegistryAdapter;
    pub use crate::traits::factory::AdapterFactory;
}
