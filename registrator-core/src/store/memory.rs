use crate::store::RegistryClient;
use async_trait::async_trait;
use registrator::{RegistryError, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A call received by a [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Ping,
    Get(String),
    List(String),
    Exists(String),
    Set {
        path: String,
        value: String,
        ttl: Duration,
    },
    Delete(String),
}

impl StoreCall {
    /// Whether the call mutates the store.
    pub fn is_write(&self) -> bool {
        matches!(self, StoreCall::Set { .. } | StoreCall::Delete(_))
    }
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

#[derive(Default)]
struct MemoryState {
    entries: BTreeMap<String, Entry>,
    calls: Vec<StoreCall>,
    unreachable: bool,
}

/// In-process store for tests and embedding without a backend.
///
/// Entries expire passively: an entry past its TTL is invisible to every read and is
/// dropped on the next access. Every trait call is journaled so callers can assert
/// exactly which reads and writes happened.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a key without TTL and without journaling the write.
    pub fn insert(&self, path: &str, value: &str) {
        self.lock().entries.insert(
            path.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Reads a live key without journaling the read.
    pub fn value(&self, path: &str) -> Option<String> {
        let now = Instant::now();
        self.lock()
            .entries
            .get(path)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Only the mutating calls received so far.
    pub fn writes(&self) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Makes every subsequent call fail with [`RegistryError::StoreUnreachable`].
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Journals the call and fails if the store is switched off.
    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.unreachable {
            return Err(RegistryError::StoreUnreachable {
                endpoint: "memory".to_string(),
                reason: "store switched off".to_string(),
            });
        }
        let now = Instant::now();
        state.entries.retain(|_, entry| entry.is_live(now));
        Ok(state)
    }
}

#[async_trait]
impl RegistryClient for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.begin(StoreCall::Ping).map(|_| ())
    }

    async fn get(&self, path: &str) -> Result<Option<String>> {
        let state = self.begin(StoreCall::Get(path.to_string()))?;
        Ok(state.entries.get(path).map(|entry| entry.value.clone()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let state = self.begin(StoreCall::List(prefix.to_string()))?;
        Ok(state
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let state = self.begin(StoreCall::Exists(path.to_string()))?;
        Ok(state.entries.contains_key(path))
    }

    async fn set_with_ttl(&self, path: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut state = self.begin(StoreCall::Set {
            path: path.to_string(),
            value: value.to_string(),
            ttl,
        })?;
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        state.entries.insert(
            path.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut state = self.begin(StoreCall::Delete(path.to_string()))?;
        state.entries.remove(path);
        Ok(())
    }
}
