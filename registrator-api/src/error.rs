use std::fmt;
use thiserror::Error;

/// The store operation that was in flight when a backend error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Get,
    List,
    Exists,
    Set,
    Delete,
    Ping,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::Get => "get",
            StoreOperation::List => "list",
            StoreOperation::Exists => "exists",
            StoreOperation::Set => "set",
            StoreOperation::Delete => "delete",
            StoreOperation::Ping => "ping",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by registry adapters and their backends.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A declared-service document could not be decoded while loading the catalog.
    #[error("Catalog entry {key} is corrupt: {source}")]
    CatalogCorrupt {
        key: String,
        source: serde_json::Error,
    },

    /// The resolved service has no `_details` entry in the store.
    #[error("Service not registered: {0}")]
    ServiceNotRegistered(String),

    /// The backend could not be reached at all.
    #[error("Store unreachable at {endpoint}: {reason}")]
    StoreUnreachable { endpoint: String, reason: String },

    /// The backend answered, but the operation failed.
    #[error("Store {operation} failed on {path}: {reason}")]
    Store {
        operation: StoreOperation,
        path: String,
        reason: String,
    },

    /// The connection URI handed to a factory is unusable.
    #[error("Invalid connection URI {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// No adapter factory is known under this scheme.
    #[error("Unknown adapter scheme: {0}")]
    UnknownScheme(String),

    /// A registration record could not be serialized.
    #[error("Failed to encode registration record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RegistryError {
    /// Builds a [`RegistryError::Store`] from any displayable backend error.
    pub fn store(operation: StoreOperation, path: &str, reason: impl fmt::Display) -> Self {
        RegistryError::Store {
            operation,
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors that must abort adapter construction.
    ///
    /// Everything else is scoped to a single call and may be retried by the host.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RegistryError::CatalogCorrupt { .. }
                | RegistryError::InvalidUri { .. }
                | RegistryError::UnknownScheme(_)
        )
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_carries_operation_and_path() {
        let err = RegistryError::store(StoreOperation::Delete, "/svc/web/abc", "timed out");
        assert_eq!(
            err.to_string(),
            "Store delete failed on /svc/web/abc: timed out"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_only_construction_errors_are_fatal() {
        let corrupt = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = RegistryError::CatalogCorrupt {
            key: "/svc/web/_details".into(),
            source: corrupt,
        };
        assert!(err.is_fatal());
        assert!(!RegistryError::ServiceNotRegistered("web".into()).is_fatal());
        assert!(
            !RegistryError::StoreUnreachable {
                endpoint: "http://127.0.0.1:2379".into(),
                reason: "connection refused".into(),
            }
            .is_fatal()
        );
    }
}
