//! Fetch-and-validate cache for outbound provider calls
//!
//! Combines a Moka in-memory cache (LRU eviction plus TTL) with request
//! coalescing: when several callers miss the same key at once, only one fetch
//! runs and every caller receives its result.
//!
//! Fetched payloads are raw JSON. They are deserialized into `V` and checked
//! with [`Validate`]; a payload that fails is logged and dropped, never
//! cached, so the next access retries immediately.
//!
//! # Cancellation
//! Each caller passes its own [`CancellationToken`]. Cancelling it only
//! detaches that caller. The shared fetch is aborted once every interested
//! caller has gone away, and its partial result is discarded.
//!
//! # Example
//! ```no_run
//! use douban_meta_core::cache::{FetchCache, Validate};
//! use serde_json::json;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Clone, serde::Deserialize)]
//! struct Detail { id: String }
//! impl Validate for Detail {}
//!
//! # async fn example() {
//! let cache = FetchCache::<Detail>::new("detail", 500, Duration::from_secs(60));
//! let detail = cache
//!     .fetch("1292052", &CancellationToken::new(), |_token| async {
//!         Ok(json!({ "id": "1292052" }))
//!     })
//!     .await;
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use moka::policy::EvictionPolicy;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::CacheSettings;
use crate::http::HttpError;

/// Error type for [`FetchCache::fetch`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The caller's token fired, or every waiter left before the fetch finished
    #[error("Fetch cancelled")]
    Cancelled,
    /// The underlying fetch failed; nothing was cached
    #[error("Upstream fetch failed: {0}")]
    Upstream(HttpError),
    /// The fetch task panicked
    #[error("Fetch worker failed - task panicked")]
    WorkerFailed,
}

/// Schema check applied to every fetched payload after deserialization.
pub trait Validate: DeserializeOwned {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

type FlightResult<V> = Result<Option<V>, CacheError>;
type SharedFlight<V> = Shared<BoxFuture<'static, FlightResult<V>>>;

struct Flight<V> {
    id: u64,
    result: SharedFlight<V>,
    cancel: CancellationToken,
    waiters: usize,
}

struct Inner<V> {
    name: &'static str,
    entries: moka::future::Cache<String, V>,
    inflight: Mutex<HashMap<String, Flight<V>>>,
    next_flight: AtomicU64,
}

/// Keyed cache that deduplicates concurrent fetches and validates payloads.
///
/// Cheap to clone; clones share entries and in-flight fetches.
pub struct FetchCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for FetchCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

enum Join<V> {
    Cached,
    Waiting(SharedFlight<V>, Interest<V>),
}

impl<V> FetchCache<V>
where
    V: Validate + Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `max_capacity` entries, each living `ttl`.
    #[must_use]
    pub fn new(name: &'static str, max_capacity: u64, ttl: Duration) -> Self {
        let entries = moka::future::Cache::builder()
            .name(name)
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            inner: Arc::new(Inner {
                name,
                entries,
                inflight: Mutex::new(HashMap::new()),
                next_flight: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn from_settings(name: &'static str, settings: &CacheSettings) -> Self {
        Self::new(
            name,
            settings.max_capacity,
            Duration::from_secs(settings.ttl_seconds),
        )
    }

    /// Return the cached value for `key`, or fetch, validate and store it.
    ///
    /// `fetch` is only invoked when no value is cached and no other caller is
    /// already fetching `key`. `Ok(None)` means the payload was missing or
    /// failed validation; treat it as "unavailable", not as an error.
    pub async fn fetch<F, Fut>(
        &self,
        key: &str,
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<Option<V>, CacheError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<Value, HttpError>> + Send + 'static,
    {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        let mut fetch = Some(fetch);
        loop {
            if let Some(value) = self.inner.entries.get(key).await {
                tracing::debug!(cache = self.inner.name, key, "Cache hit");
                return Ok(Some(value));
            }

            let (result, _interest) = match self.join_or_start(key, &mut fetch)? {
                Join::Cached => continue,
                Join::Waiting(result, interest) => (result, interest),
            };

            return tokio::select! {
                biased;
                () = cancel.cancelled() => Err(CacheError::Cancelled),
                outcome = result => outcome,
            };
        }
    }

    /// Cached value for `key`, without fetching.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.entries.get(key).await
    }

    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entries.entry_count()
    }

    /// Apply pending evictions and expirations.
    pub async fn run_pending_tasks(&self) {
        self.inner.entries.run_pending_tasks().await;
    }

    fn join_or_start<F, Fut>(
        &self,
        key: &str,
        fetch: &mut Option<F>,
    ) -> Result<Join<V>, CacheError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<Value, HttpError>> + Send + 'static,
    {
        let mut inflight = self.inner.inflight.lock();

        if let Some(flight) = inflight.get_mut(key) {
            flight.waiters += 1;
            tracing::debug!(
                cache = self.inner.name,
                key,
                waiters = flight.waiters,
                "Joined in-flight fetch"
            );
            let interest = Interest::new(&self.inner, key, flight.id);
            return Ok(Join::Waiting(flight.result.clone(), interest));
        }

        // A flight may have finished between our lookup and taking the lock.
        if self.inner.entries.contains_key(key) {
            return Ok(Join::Cached);
        }

        let fetch = fetch.take().ok_or(CacheError::WorkerFailed)?;
        let id = self.inner.next_flight.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        tracing::debug!(cache = self.inner.name, key, "Cache miss, fetching");
        let task = tokio::spawn(run_flight(
            Arc::clone(&self.inner),
            key.to_owned(),
            id,
            token.clone(),
            fetch(token.clone()),
        ));

        let result = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_cancelled() => Err(CacheError::Cancelled),
                Err(_) => Err(CacheError::WorkerFailed),
            }
        }
        .boxed()
        .shared();

        inflight.insert(
            key.to_owned(),
            Flight {
                id,
                result: result.clone(),
                cancel: token,
                waiters: 1,
            },
        );

        Ok(Join::Waiting(result, Interest::new(&self.inner, key, id)))
    }
}

impl<V> Inner<V>
where
    V: Validate,
{
    fn validate(&self, key: &str, raw: Value) -> Option<V> {
        if raw.is_null() {
            tracing::debug!(cache = self.name, key, "Fetch returned no data");
            return None;
        }

        let value = match serde_json::from_value::<V>(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(cache = self.name, key, error = %err, "Payload failed schema validation");
                return None;
            }
        };

        if let Err(reason) = value.validate() {
            tracing::warn!(cache = self.name, key, reason = %reason, "Payload failed schema validation");
            return None;
        }

        Some(value)
    }
}

impl<V> Inner<V> {
    fn finish(&self, key: &str, id: u64) {
        let mut inflight = self.inflight.lock();
        if inflight.get(key).is_some_and(|flight| flight.id == id) {
            inflight.remove(key);
        }
    }
}

async fn run_flight<V, Fut>(
    inner: Arc<Inner<V>>,
    key: String,
    id: u64,
    cancel: CancellationToken,
    fetch: Fut,
) -> FlightResult<V>
where
    V: Validate + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HttpError>> + Send,
{
    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CacheError::Cancelled),
        raw = fetch => match raw {
            Ok(raw) => Ok(inner.validate(&key, raw)),
            Err(HttpError::Cancelled) => Err(CacheError::Cancelled),
            Err(err) => {
                tracing::warn!(cache = inner.name, key = %key, error = %err, "Fetch failed");
                Err(CacheError::Upstream(err))
            }
        },
    };

    // Store before leaving the in-flight map so late arrivals see the value.
    if let Ok(Some(value)) = &outcome {
        inner.entries.insert(key.clone(), value.clone()).await;
    }
    inner.finish(&key, id);

    outcome
}

/// One caller's stake in an in-flight fetch.
///
/// Dropping the last stake cancels the fetch.
struct Interest<V> {
    inner: Arc<Inner<V>>,
    key: String,
    id: u64,
}

impl<V> Interest<V> {
    fn new(inner: &Arc<Inner<V>>, key: &str, id: u64) -> Self {
        Self {
            inner: Arc::clone(inner),
            key: key.to_owned(),
            id,
        }
    }
}

impl<V> Drop for Interest<V> {
    fn drop(&mut self) {
        let mut inflight = self.inner.inflight.lock();
        let Some(flight) = inflight.get_mut(&self.key) else {
            return;
        };
        if flight.id != self.id {
            return;
        }

        flight.waiters = flight.waiters.saturating_sub(1);
        if flight.waiters == 0 {
            if let Some(flight) = inflight.remove(&self.key) {
                flight.cancel.cancel();
                tracing::debug!(cache = self.inner.name, key = %self.key, "All waiters left, fetch aborted");
            }
        }
    }
}
