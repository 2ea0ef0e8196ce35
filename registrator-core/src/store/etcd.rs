//! etcd v3 backend.

use crate::store::RegistryClient;
use async_trait::async_trait;
use etcd_client::{Client, ConnectOptions, Error as EtcdError, GetOptions, PutOptions};
use log::{debug, info};
use registrator::{RegistryError, Result, StoreOperation};
use std::time::Duration;
use tonic::Code;

/// Endpoint used when the connection URI names no host.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:2379";

/// [`RegistryClient`] backed by an etcd cluster.
///
/// TTLs are implemented with leases: each write grants a fresh lease and attaches the
/// key to it, so re-writing a key restarts its expiry clock.
#[derive(Clone)]
pub struct EtcdStore {
    client: Client,
    endpoints: Vec<String>,
}

impl EtcdStore {
    /// Connects to the given endpoints, or to [`DEFAULT_ENDPOINT`] when none are given.
    ///
    /// # Arguments
    ///
    /// * `endpoints` - etcd endpoints, e.g. `http://10.0.0.1:2379`.
    /// * `timeout` - Per-request timeout, also used for connecting.
    pub async fn connect(endpoints: Vec<String>, timeout: Duration) -> Result<Self> {
        let endpoints = if endpoints.is_empty() {
            vec![DEFAULT_ENDPOINT.to_string()]
        } else {
            endpoints
        };

        let options = ConnectOptions::new()
            .with_connect_timeout(timeout)
            .with_timeout(timeout)
            .with_keep_alive(Duration::from_secs(30), Duration::from_secs(10));

        let client = Client::connect(&endpoints, Some(options))
            .await
            .map_err(|e| RegistryError::StoreUnreachable {
                endpoint: endpoints.join(","),
                reason: e.to_string(),
            })?;

        info!("Store: Connected to etcd at {}", endpoints.join(","));
        Ok(Self { client, endpoints })
    }

    pub fn get_endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Maps a client error, treating connectivity failures as an unreachable backend.
    fn map_error(&self, operation: StoreOperation, path: &str, err: EtcdError) -> RegistryError {
        if is_unreachable(&err) {
            return RegistryError::StoreUnreachable {
                endpoint: self.endpoints.join(","),
                reason: err.to_string(),
            };
        }
        RegistryError::store(operation, path, err)
    }
}

/// Whether the error means the cluster could not be talked to at all.
fn is_unreachable(err: &EtcdError) -> bool {
    match err {
        EtcdError::TransportError(_) => true,
        EtcdError::GRpcStatus(status) => matches!(
            status.code(),
            Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled
        ),
        _ => false,
    }
}

/// Decodes a listed key-value pair. Non UTF-8 keys or values are an error, never patched.
fn decode_entry(prefix: &str, key: &[u8], value: &[u8]) -> Result<(String, String)> {
    let key = std::str::from_utf8(key)
        .map_err(|e| RegistryError::store(StoreOperation::List, prefix, e))?;
    let value = std::str::from_utf8(value)
        .map_err(|e| RegistryError::store(StoreOperation::List, key, e))?;
    Ok((key.to_string(), value.to_string()))
}

/// Lease length in whole seconds, rounded up so a key never outlives less than its TTL.
fn lease_seconds(ttl: Duration) -> i64 {
    let mut secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs += 1;
    }
    i64::try_from(secs).unwrap_or(i64::MAX)
}

#[async_trait]
impl RegistryClient for EtcdStore {
    async fn ping(&self) -> Result<()> {
        let mut client = self.client.clone();
        client
            .status()
            .await
            .map_err(|e| RegistryError::StoreUnreachable {
                endpoint: self.endpoints.join(","),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<String>> {
        let mut client = self.client.clone();
        let response = client
            .get(path, None)
            .await
            .map_err(|e| self.map_error(StoreOperation::Get, path, e))?;

        match response.kvs().first() {
            Some(kv) => {
                let value = kv
                    .value_str()
                    .map_err(|e| RegistryError::store(StoreOperation::Get, path, e))?;
                Ok(Some(value.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let mut client = self.client.clone();
        let response = client
            .get(prefix, Some(GetOptions::new().with_prefix()))
            .await
            .map_err(|e| self.map_error(StoreOperation::List, prefix, e))?;

        let mut entries = Vec::with_capacity(response.kvs().len());
        for kv in response.kvs() {
            entries.push(decode_entry(prefix, kv.key(), kv.value())?);
        }
        debug!("Store: Listed {} keys under {}", entries.len(), prefix);
        Ok(entries)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let mut client = self.client.clone();
        let response = client
            .get(path, Some(GetOptions::new().with_count_only()))
            .await
            .map_err(|e| self.map_error(StoreOperation::Exists, path, e))?;
        Ok(response.count() > 0)
    }

    async fn set_with_ttl(&self, path: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut client = self.client.clone();

        let options = if ttl.is_zero() {
            None
        } else {
            let lease = client
                .lease_grant(lease_seconds(ttl), None)
                .await
                .map_err(|e| self.map_error(StoreOperation::Set, path, e))?;
            Some(PutOptions::new().with_lease(lease.id()))
        };

        client
            .put(path, value, options)
            .await
            .map_err(|e| self.map_error(StoreOperation::Set, path, e))?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut client = self.client.clone();
        let response = client
            .delete(path, None)
            .await
            .map_err(|e| self.map_error(StoreOperation::Delete, path, e))?;
        if response.deleted() == 0 {
            debug!("Store: {} was already absent", path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_rounds_up_to_whole_seconds() {
        assert_eq!(lease_seconds(Duration::from_secs(30)), 30);
        assert_eq!(lease_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(lease_seconds(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_invalid_utf8_in_listed_value_is_an_error() {
        let value = b"{\"image\":\"myorg/\xffweb\"}";
        let err = decode_entry("/svc/", b"/svc/web/_details", value).unwrap_err();
        match err {
            RegistryError::Store {
                operation, path, ..
            } => {
                assert_eq!(operation, StoreOperation::List);
                assert_eq!(path, "/svc/web/_details");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(decode_entry("/svc/", b"/svc/\xff/_details", b"{}").is_err());
        assert_eq!(
            decode_entry("/svc/", b"/svc/web/_details", b"{}").unwrap(),
            ("/svc/web/_details".to_string(), "{}".to_string())
        );
    }

    #[test]
    fn test_connectivity_errors_are_unreachable() {
        assert!(is_unreachable(&EtcdError::GRpcStatus(tonic::Status::unavailable(
            "connection refused"
        ))));
        assert!(is_unreachable(&EtcdError::GRpcStatus(
            tonic::Status::deadline_exceeded("timed out")
        )));
        assert!(!is_unreachable(&EtcdError::GRpcStatus(
            tonic::Status::permission_denied("no")
        )));
        assert!(!is_unreachable(&EtcdError::InvalidArgs("bad key".into())));
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let endpoints = vec!["http://127.0.0.1:1".to_string()];
        let result = match EtcdStore::connect(endpoints, Duration::from_millis(500)).await {
            Ok(store) => {
                assert_eq!(store.get_endpoints(), ["http://127.0.0.1:1"]);
                store.ping().await
            }
            Err(e) => Err(e),
        };
        assert!(matches!(
            result,
            Err(RegistryError::StoreUnreachable { .. })
        ));
    }
}
