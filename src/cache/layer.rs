//! Cache layer that orchestrates caching logic with network fetching.

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::graphql::{ClientError, GraphqlRequest, GraphqlTransport};

use super::entry::{CacheEntry, CacheResult, FetchOptions, Fingerprint};
use super::storage::CacheStorage;

type PendingFetch = Shared<BoxFuture<'static, Result<Value, ClientError>>>;
type InFlight = Arc<Mutex<HashMap<Fingerprint, PendingFetch>>>;

/// Outcome of [`CacheLayer::join_or_start`].
enum Joined {
  /// A leader stored a fresh entry after the first lookup
  Cached(CacheEntry),
  /// Waiting on a network call; `true` for the caller that started it
  Pending(PendingFetch, bool),
}

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between the stores and the GraphQL transport. Cloning is cheap and
/// every clone shares the same storage and in-flight registry.
#[derive(Clone)]
pub struct CacheLayer {
  transport: Arc<dyn GraphqlTransport>,
  storage: Arc<dyn CacheStorage>,
  in_flight: InFlight,
  /// Bumped by `clear`; responses started under an older generation are not stored
  generation: Arc<AtomicU64>,
}

impl CacheLayer {
  pub fn new<T, S>(transport: T, storage: S) -> Self
  where
    T: GraphqlTransport + 'static,
    S: CacheStorage + 'static,
  {
    Self::from_parts(Arc::new(transport), Arc::new(storage))
  }

  pub fn from_parts(transport: Arc<dyn GraphqlTransport>, storage: Arc<dyn CacheStorage>) -> Self {
    Self {
      transport,
      storage,
      in_flight: Arc::new(Mutex::new(HashMap::new())),
      generation: Arc::new(AtomicU64::new(0)),
    }
  }

  /// Fetch `query` with `variables`, serving a fresh cached response if one
  /// exists. Returns the response `data`.
  pub async fn cached_fetch(
    &self,
    query: &str,
    variables: &Value,
    options: FetchOptions,
  ) -> Result<Value, ClientError> {
    self
      .fetch(query, variables, options)
      .await
      .map(|result| result.data)
  }

  /// Same as [`cached_fetch`](Self::cached_fetch) but reports where the data came from.
  ///
  /// 1. `ttl == 0`: go straight to the network, store nothing
  /// 2. Fresh entry in storage: return it
  /// 3. Identical request already in flight: wait for it
  /// 4. Otherwise fetch, and store the response on success
  pub async fn fetch(
    &self,
    query: &str,
    variables: &Value,
    options: FetchOptions,
  ) -> Result<CacheResult<Value>, ClientError> {
    let request = GraphqlRequest::new(query, variables.clone());

    if !options.is_cacheable() {
      debug!("ttl is zero, bypassing cache");
      let data = self.transport.execute(request).await?;
      return Ok(CacheResult::from_network(data));
    }

    let fingerprint = Fingerprint::of(&request);

    if let Some(entry) = self.lookup(&fingerprint) {
      return Ok(CacheResult::from_cache(entry.value, entry.cached_at));
    }

    let (pending, leader) = match self.join_or_start(fingerprint, request, options.ttl) {
      Joined::Cached(entry) => return Ok(CacheResult::from_cache(entry.value, entry.cached_at)),
      Joined::Pending(pending, leader) => (pending, leader),
    };
    let data = pending.await?;

    Ok(if leader {
      CacheResult::from_network(data)
    } else {
      CacheResult::coalesced(data)
    })
  }

  /// Fresh entry for `fingerprint`, if any. Storage faults count as a miss.
  fn lookup(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
    match self.storage.get(fingerprint) {
      Ok(Some(entry)) if !entry.is_expired(Utc::now()) => {
        debug!(%fingerprint, "cache hit");
        Some(entry)
      }
      Ok(Some(_)) => {
        debug!(%fingerprint, "cache entry expired");
        None
      }
      Ok(None) => {
        debug!(%fingerprint, "cache miss");
        None
      }
      Err(e) => {
        warn!(%fingerprint, error = %e, "cache read failed, falling back to network");
        None
      }
    }
  }

  /// Join the in-flight request for `fingerprint` or start a new one.
  fn join_or_start(
    &self,
    fingerprint: Fingerprint,
    request: GraphqlRequest,
    ttl: Duration,
  ) -> Joined {
    let mut in_flight = lock(&self.in_flight);

    if let Some(pending) = in_flight.get(&fingerprint) {
      debug!(%fingerprint, "joining in-flight request");
      return Joined::Pending(pending.clone(), false);
    }

    // A leader stores before it deregisters, so with the registry locked a
    // finished request is always visible in storage.
    if let Some(entry) = self.lookup(&fingerprint) {
      return Joined::Cached(entry);
    }

    let network = self.transport.execute(request);
    let storage = Arc::clone(&self.storage);
    let registry = Arc::clone(&self.in_flight);
    let generation = Arc::clone(&self.generation);
    let started = generation.load(Ordering::Acquire);
    let key = fingerprint.clone();

    // Store and deregister inside the shared future so it happens exactly
    // once, whichever caller drives it to completion.
    let pending = async move {
      let result = network.await;

      let mut in_flight = lock(&registry);
      if generation.load(Ordering::Acquire) != started {
        debug!(fingerprint = %key, "cache cleared while in flight, dropping response");
        return result;
      }

      if let Ok(value) = &result {
        if let Err(e) = storage.put(key.clone(), CacheEntry::new(value.clone(), ttl)) {
          warn!(fingerprint = %key, error = %e, "failed to store response in cache");
        }
      }

      in_flight.remove(&key);
      result
    }
    .boxed()
    .shared();

    in_flight.insert(fingerprint, pending.clone());
    Joined::Pending(pending, true)
  }

  /// Drop the cached response for a request, if present.
  pub fn invalidate(&self, query: &str, variables: &Value) -> bool {
    let fingerprint = Fingerprint::of(&GraphqlRequest::new(query, variables.clone()));
    match self.storage.remove(&fingerprint) {
      Ok(removed) => removed,
      Err(e) => {
        warn!(%fingerprint, error = %e, "failed to invalidate cache entry");
        false
      }
    }
  }

  /// Drop every cached response. Requests still in flight finish for their
  /// callers but are neither stored nor joined by later calls.
  pub fn clear(&self) {
    {
      let mut in_flight = lock(&self.in_flight);
      self.generation.fetch_add(1, Ordering::AcqRel);
      in_flight.clear();
    }
    if let Err(e) = self.storage.clear() {
      warn!(error = %e, "failed to clear cache");
    }
  }

  /// Remove expired entries now. Returns how many were dropped.
  pub fn sweep_expired(&self) -> usize {
    match self.storage.sweep_expired(Utc::now()) {
      Ok(removed) => {
        if removed > 0 {
          debug!(removed, "swept expired cache entries");
        }
        removed
      }
      Err(e) => {
        warn!(error = %e, "cache sweep failed");
        0
      }
    }
  }

  /// Sweep expired entries every `interval` until the handle is aborted.
  pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
    let cache = self.clone();
    tokio::spawn(async move {
      let mut ticker = tokio::time::interval(interval);
      // First tick completes immediately
      ticker.tick().await;
      loop {
        ticker.tick().await;
        cache.sweep_expired();
      }
    })
  }

  /// Number of stored entries, expired ones included.
  pub fn len(&self) -> usize {
    self.storage.len().unwrap_or_else(|e| {
      warn!(error = %e, "failed to count cache entries");
      0
    })
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
