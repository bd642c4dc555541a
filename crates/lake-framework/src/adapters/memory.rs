//! In-memory Lake Store Adapter
//!
//! Implements `LakeStore` over a sorted map, with scripted responses to
//! simulate the lake's eventual consistency: objects that are not visible
//! yet, stale bodies, connection drops and stalls.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

use super::paginate_common_prefixes;
use crate::domain::StoreError;
use crate::ports::{LakeStore, ListPage, ListRequest};

/// A scripted response, served once in place of the stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InjectedResponse {
    /// Pretend the object is not visible yet.
    NotFound,
    /// Fail with a connection error.
    Connection,
    /// Fail with a timeout error.
    Timeout,
    /// Never answer. Only the caller's own timeout ends the request.
    Stall,
    /// Serve this body instead of the stored one (a stale version).
    Body(Vec<u8>),
}

/// In-memory lake store for tests and simulations.
#[derive(Default)]
pub struct InMemoryLakeStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    injected: Mutex<HashMap<String, VecDeque<InjectedResponse>>>,
    list_failures: Mutex<VecDeque<StoreError>>,
    list_calls: AtomicUsize,
    get_attempts: Mutex<HashMap<String, usize>>,
}

impl InMemoryLakeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or overwrite) an object.
    pub fn put(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects.write().insert(key.into(), body.into());
    }

    /// Delete an object, returning its body.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.write().remove(key)
    }

    /// Queue a scripted response for the next get of `key`.
    ///
    /// Responses queue up; each get consumes one before the stored object
    /// is served again.
    pub fn inject(&self, key: impl Into<String>, response: InjectedResponse) {
        self.injected
            .lock()
            .entry(key.into())
            .or_default()
            .push_back(response);
    }

    /// Make `key` invisible for the next `attempts` gets.
    pub fn hide_for(&self, key: &str, attempts: usize) {
        for _ in 0..attempts {
            self.inject(key, InjectedResponse::NotFound);
        }
    }

    /// Fail the next listing call with `error`.
    pub fn fail_next_list(&self, error: StoreError) {
        self.list_failures.lock().push_back(error);
    }

    /// Number of listing calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of gets issued for `key`, injected responses included.
    pub fn get_attempts(&self, key: &str) -> usize {
        self.get_attempts.lock().get(key).copied().unwrap_or(0)
    }

    /// Total number of gets across all keys.
    pub fn get_calls(&self) -> usize {
        self.get_attempts.lock().values().sum()
    }

    /// Number of gets for keys ending in `suffix` (e.g. `"/block.json"`).
    pub fn get_calls_matching(&self, suffix: &str) -> usize {
        self.get_attempts
            .lock()
            .iter()
            .filter(|(key, _)| key.ends_with(suffix))
            .map(|(_, n)| n)
            .sum()
    }
}

#[async_trait]
impl LakeStore for InMemoryLakeStore {
    async fn list_common_prefixes(&self, request: ListRequest) -> Result<ListPage, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.list_failures.lock().pop_front() {
            return Err(error);
        }

        let objects = self.objects.read();
        Ok(paginate_common_prefixes(
            objects.keys().map(String::as_str),
            &request,
        ))
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        *self.get_attempts.lock().entry(key.to_string()).or_insert(0) += 1;

        let scripted = self
            .injected
            .lock()
            .get_mut(key)
            .and_then(VecDeque::pop_front);

        if let Some(response) = scripted {
            trace!("[lake] Injected response for {}: {:?}", key, response);
            return match response {
                InjectedResponse::NotFound => Err(StoreError::NotFound {
                    key: key.to_string(),
                }),
                InjectedResponse::Connection => {
                    Err(StoreError::Connection("injected connection reset".to_string()))
                }
                InjectedResponse::Timeout => Err(StoreError::Timeout {
                    key: key.to_string(),
                }),
                InjectedResponse::Stall => std::future::pending().await,
                InjectedResponse::Body(body) => Ok(body),
            };
        }

        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}
