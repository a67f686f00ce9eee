use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, FetchOptions};
use crate::graphql::ClientError;

use super::error::StoreError;
use super::messages;
use super::resource::{decode_field, Resource};
use super::state::StoreState;

/// State container for one entity type.
///
/// Built once per application and shared by reference or `Arc`; every action
/// takes `&self`.
pub struct Store<T: Resource> {
  cache: CacheLayer,
  ttl: Duration,
  state: watch::Sender<StoreState<T>>,
  /// Bumped by `reset`; results of requests started before it are dropped
  epoch: AtomicU64,
  pub(super) hydrated: AtomicBool,
}

impl<T: Resource> Store<T> {
  pub fn new(cache: CacheLayer) -> Self {
    Self::with_ttl(cache, T::DEFAULT_TTL)
  }

  pub fn with_ttl(cache: CacheLayer, ttl: Duration) -> Self {
    let (state, _) = watch::channel(StoreState::default());
    Self {
      cache,
      ttl,
      state,
      epoch: AtomicU64::new(0),
      hydrated: AtomicBool::new(false),
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Copy of the current state.
  pub fn snapshot(&self) -> StoreState<T> {
    self.state.borrow().clone()
  }

  /// Receiver notified on every state change.
  pub fn subscribe(&self) -> watch::Receiver<StoreState<T>> {
    self.state.subscribe()
  }

  pub fn entities(&self) -> Vec<T> {
    self.state.borrow().entities.clone()
  }

  pub fn is_loading(&self) -> bool {
    self.state.borrow().is_loading
  }

  pub fn error(&self) -> Option<String> {
    self.state.borrow().error.clone()
  }

  pub fn is_initialized(&self) -> bool {
    self.state.borrow().initialized
  }

  /// Load the full list.
  ///
  /// `force_refresh` skips the cache. On failure the error message is
  /// recorded and the previous entities stay in place.
  pub async fn fetch_all(&self, force_refresh: bool) {
    let epoch = self.epoch();
    self.state.send_modify(|s| {
      s.is_loading = true;
      s.error = None;
    });

    let ttl = if force_refresh {
      Duration::ZERO
    } else {
      self.ttl
    };

    let result = self
      .cache
      .cached_fetch(T::LIST_QUERY, &T::list_variables(), FetchOptions::ttl(ttl))
      .await
      .and_then(|data| decode_field::<Vec<T>>(data, T::LIST_FIELD));

    if self.epoch() != epoch {
      debug!(kind = T::KIND, "store reset while loading, dropping result");
      return;
    }

    match result {
      Ok(mut entities) => {
        entities.sort_by(T::compare);
        info!(kind = T::KIND, count = entities.len(), force_refresh, "store loaded");
        self.state.send_modify(move |s| {
          s.entities = entities;
          s.is_loading = false;
          s.initialized = true;
        });
      }
      Err(err) => {
        warn!(kind = T::KIND, error = %err, "store fetch failed");
        let message = messages::user_message(&err);
        self.state.send_modify(move |s| {
          s.error = Some(message);
          s.is_loading = false;
        });
      }
    }
  }

  /// Fetch only if nothing has been loaded or hydrated yet.
  pub async fn ensure_loaded(&self) {
    if self.is_initialized() {
      debug!(kind = T::KIND, "store already initialized");
      return;
    }
    self.fetch_all(false).await;
  }

  pub fn get_by_id(&self, id: &str) -> Option<T> {
    self.find(|e| e.id() == id)
  }

  pub fn find<P>(&self, predicate: P) -> Option<T>
  where
    P: Fn(&T) -> bool,
  {
    self.state.borrow().entities.iter().find(|e| predicate(e)).cloned()
  }

  pub fn filter<P>(&self, predicate: P) -> Vec<T>
  where
    P: Fn(&T) -> bool,
  {
    self
      .state
      .borrow()
      .entities
      .iter()
      .filter(|e| predicate(e))
      .cloned()
      .collect()
  }

  /// Run a mutation returning a new record and append it.
  pub async fn create(
    &self,
    document: &str,
    variables: Value,
    field: &str,
  ) -> Result<T, StoreError> {
    let data = self.write(document, variables).await?;
    let created: T = decode_field(data, field).map_err(|e| self.fail_write(e.into()))?;

    let committed = created.clone();
    self.state.send_modify(move |s| {
      s.entities.push(committed);
      s.entities.sort_by(T::compare);
      s.is_loading = false;
    });
    debug!(kind = T::KIND, id = created.id(), "record created");
    Ok(created)
  }

  /// Run a mutation returning an updated record and replace it by id.
  pub async fn update(
    &self,
    document: &str,
    variables: Value,
    field: &str,
  ) -> Result<T, StoreError> {
    let data = self.write(document, variables).await?;
    let updated: T = decode_field(data, field).map_err(|e| self.fail_write(e.into()))?;

    let committed = updated.clone();
    self.state.send_modify(move |s| {
      match s.entities.iter_mut().find(|e| e.id() == committed.id()) {
        Some(existing) => *existing = committed,
        None => s.entities.push(committed),
      }
      s.entities.sort_by(T::compare);
      s.is_loading = false;
    });
    debug!(kind = T::KIND, id = updated.id(), "record updated");
    Ok(updated)
  }

  /// Run a deleting mutation and drop the record with `id`.
  pub async fn delete(&self, document: &str, variables: Value, id: &str) -> Result<(), StoreError> {
    self.write(document, variables).await?;

    self.state.send_modify(|s| {
      s.entities.retain(|e| e.id() != id);
      s.is_loading = false;
    });
    debug!(kind = T::KIND, id, "record deleted");
    Ok(())
  }

  /// Back to the empty initial state. A load still in flight is discarded
  /// when it lands.
  pub fn reset(&self) {
    self.epoch.fetch_add(1, Ordering::AcqRel);
    self.state.send_replace(StoreState::default());
    debug!(kind = T::KIND, "store reset");
  }

  pub(super) fn replace_state<F>(&self, modify: F)
  where
    F: FnOnce(&mut StoreState<T>),
  {
    self.state.send_modify(modify);
  }

  /// Uncached request for a write action. Loading stays set on success; the
  /// caller commits and clears it.
  ///
  /// A successful write makes the cached list stale, so it is dropped and the
  /// next `fetch_all` goes to the network.
  async fn write(&self, document: &str, variables: Value) -> Result<Value, StoreError> {
    self.state.send_modify(|s| {
      s.is_loading = true;
      s.error = None;
    });

    let data = self
      .cache
      .cached_fetch(document, &variables, FetchOptions::no_cache())
      .await
      .map_err(|e: ClientError| self.fail_write(e.into()))?;

    self.cache.invalidate(T::LIST_QUERY, &T::list_variables());
    Ok(data)
  }

  fn epoch(&self) -> u64 {
    self.epoch.load(Ordering::Acquire)
  }

  /// Record a write failure in state and hand it back for the caller to return.
  pub(crate) fn fail_write(&self, err: StoreError) -> StoreError {
    warn!(kind = T::KIND, error = %err, "store write failed");
    let message = err.user_message();
    self.state.send_modify(move |s| {
      s.error = Some(message);
      s.is_loading = false;
    });
    err
  }
}
