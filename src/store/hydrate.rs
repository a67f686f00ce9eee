//! Seeding stores from server-rendered data.

use std::sync::atomic::Ordering;
use tracing::{debug, info};

use super::container::Store;
use super::resource::Resource;

impl<T: Resource> Store<T> {
  /// Seed the store with data fetched ahead of time and mark it initialized.
  ///
  /// Works once per store instance; `reset` does not re-arm it. Returns
  /// whether the data was applied.
  pub fn hydrate(&self, mut entities: Vec<T>) -> bool {
    if self.hydrated.swap(true, Ordering::AcqRel) {
      debug!(kind = T::KIND, "store already hydrated, ignoring");
      return false;
    }

    entities.sort_by(T::compare);
    info!(kind = T::KIND, count = entities.len(), "store hydrated");
    self.replace_state(|s| {
      s.entities = entities;
      s.is_loading = false;
      s.error = None;
      s.initialized = true;
    });
    true
  }

  pub fn is_hydrated(&self) -> bool {
    self.hydrated.load(Ordering::Acquire)
  }
}

#[cfg(test)]
mod tests {
  use crate::cache::{CacheLayer, MemoryStorage};
  use crate::market::Category;
  use crate::store::Store;
  use crate::testing::MockTransport;
  use serde_json::json;

  fn category(id: &str, priority: i32) -> Category {
    Category {
      id: id.to_string(),
      name: id.to_uppercase(),
      slug: id.to_string(),
      parent_id: None,
      priority,
      icon: None,
      listing_count: 0,
    }
  }

  #[tokio::test]
  async fn test_hydrate_once_and_skip_fetch() {
    let mock = MockTransport::returning(json!({"categories": []}));
    let store: Store<Category> = Store::new(CacheLayer::new(mock.clone(), MemoryStorage::default()));

    assert!(store.hydrate(vec![category("b", 2), category("a", 1)]));
    assert!(!store.hydrate(vec![category("z", 0)]));
    assert!(store.is_hydrated());

    let ids: Vec<_> = store.entities().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    store.ensure_loaded().await;
    assert_eq!(mock.calls(), 0);
  }

  #[tokio::test]
  async fn test_reset_does_not_rearm_hydration() {
    let mock = MockTransport::returning(json!({"categories": []}));
    let store: Store<Category> = Store::new(CacheLayer::new(mock, MemoryStorage::default()));

    store.hydrate(vec![category("a", 1)]);
    store.reset();

    assert!(!store.hydrate(vec![category("b", 1)]));
    assert!(store.entities().is_empty());
    assert!(!store.is_initialized());
  }
}
