use color_eyre::Result;
use tracing::info;

use crate::cache::{CacheLayer, CacheStorage, MemoryStorage, SqliteStorage};
use crate::config::{Config, TtlPolicy};
use crate::db::Database;
use crate::graphql::GraphqlClient;
use crate::store::{Resource, Store};

use super::snapshot::MarketSnapshot;
use super::types::{AdPackage, Category, ContactMessage, Permission, Report, SubscriptionPlan};

/// Every marketplace store, built once per application and passed around
/// explicitly. All stores share one cache layer.
pub struct MarketStores {
  cache: CacheLayer,
  pub categories: Store<Category>,
  pub ad_packages: Store<AdPackage>,
  pub plans: Store<SubscriptionPlan>,
  pub reports: Store<Report>,
  pub contacts: Store<ContactMessage>,
  pub permissions: Store<Permission>,
}

impl MarketStores {
  pub fn new(cache: CacheLayer, ttl: &TtlPolicy) -> Self {
    fn build<T: Resource>(cache: &CacheLayer, ttl: &TtlPolicy) -> Store<T> {
      Store::with_ttl(cache.clone(), ttl.ttl_for(T::KIND, T::DEFAULT_TTL))
    }

    Self {
      categories: build(&cache, ttl),
      ad_packages: build(&cache, ttl),
      plans: build(&cache, ttl),
      reports: build(&cache, ttl),
      contacts: build(&cache, ttl),
      permissions: build(&cache, ttl),
      cache,
    }
  }

  /// Wire the HTTP client and cache storage described by `config`.
  pub fn from_config(config: &Config) -> Result<Self> {
    let client = GraphqlClient::new(&config.api)?;
    info!(endpoint = %client.endpoint(), persist = config.cache.persist, "marketplace client ready");

    let storage: Box<dyn CacheStorage> = if config.cache.persist {
      let db = Database::open(&config.data_dir()?)?;
      Box::new(SqliteStorage::new(db))
    } else {
      Box::new(MemoryStorage::new(config.cache.capacity))
    };

    let cache = CacheLayer::from_parts(std::sync::Arc::new(client), storage.into());
    Ok(Self::new(cache, &config.ttl))
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  /// Seed each store present in the snapshot. Returns how many took the data.
  pub fn hydrate(&self, snapshot: MarketSnapshot) -> usize {
    let applied = [
      snapshot.categories.map(|v| self.categories.hydrate(v)),
      snapshot.ad_packages.map(|v| self.ad_packages.hydrate(v)),
      snapshot.subscription_plans.map(|v| self.plans.hydrate(v)),
      snapshot.reports.map(|v| self.reports.hydrate(v)),
      snapshot.contact_messages.map(|v| self.contacts.hydrate(v)),
      snapshot.permissions.map(|v| self.permissions.hydrate(v)),
    ]
    .into_iter()
    .filter(|applied| *applied == Some(true))
    .count();

    info!(applied, "stores hydrated from snapshot");
    applied
  }

  /// Load the public catalogue (categories, packages, plans) concurrently,
  /// skipping stores that are already initialized.
  pub async fn load_catalog(&self) {
    futures::join!(
      self.categories.ensure_loaded(),
      self.ad_packages.ensure_loaded(),
      self.plans.ensure_loaded(),
    );
  }

  /// Empty every store.
  pub fn reset_all(&self) {
    self.categories.reset();
    self.ad_packages.reset();
    self.plans.reset();
    self.reports.reset();
    self.contacts.reset();
    self.permissions.reset();
  }

  /// Drop everything tied to the current session: store state and cached responses.
  pub fn sign_out(&self) {
    self.reset_all();
    self.cache.clear();
    info!("session state cleared");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MockTransport;
  use serde_json::json;
  use std::sync::Arc;
  use std::time::Duration;

  fn stores(mock: &MockTransport, ttl: &TtlPolicy) -> MarketStores {
    MarketStores::new(CacheLayer::new(mock.clone(), MemoryStorage::default()), ttl)
  }

  #[test]
  fn test_ttl_policy_applies_per_kind() {
    let mock = MockTransport::returning(json!({}));
    let ttl = TtlPolicy::default().with_override("reports", 5_000);
    let stores = stores(&mock, &ttl);

    assert_eq!(stores.reports.ttl(), Duration::from_secs(5));
    assert_eq!(stores.categories.ttl(), Category::DEFAULT_TTL);
  }

  #[tokio::test]
  async fn test_hydrate_then_load_catalog_fetches_only_missing() {
    let mock = MockTransport::routed(|request| {
      if request.query.contains("adPackages") {
        Ok(json!({"adPackages": []}))
      } else {
        Ok(json!({"subscriptionPlans": []}))
      }
    });
    let stores = stores(&mock, &TtlPolicy::default());

    let snapshot = MarketSnapshot::from_json(
      r#"{"categories": [{"id": "c1", "name": "Jobs", "slug": "jobs", "parentId": null, "icon": null}]}"#,
    )
    .unwrap();
    assert_eq!(stores.hydrate(snapshot.clone()), 1);
    assert_eq!(stores.hydrate(snapshot), 0);

    stores.load_catalog().await;

    assert_eq!(mock.calls(), 2);
    assert!(mock
      .requests()
      .iter()
      .all(|r| !r.query.contains("categories")));
    assert_eq!(stores.categories.entities().len(), 1);
    assert!(stores.plans.is_initialized());
  }

  #[tokio::test]
  async fn test_sign_out_clears_cache_and_state() {
    let mock = MockTransport::returning(json!({"myPermissions": [{"id": "p1", "key": "ads.create", "description": null}]}));
    let stores = stores(&mock, &TtlPolicy::default());

    stores.permissions.fetch_all(false).await;
    assert!(stores.permissions.has_permission("ads.create"));
    assert_eq!(stores.cache().len(), 1);

    stores.sign_out();

    assert!(!stores.permissions.has_permission("ads.create"));
    assert!(stores.cache().is_empty());

    stores.permissions.fetch_all(false).await;
    assert_eq!(mock.calls(), 2);
  }

  #[tokio::test]
  async fn test_sign_out_discards_load_in_flight() {
    let mock = MockTransport::gated();
    let stores = Arc::new(stores(&mock, &TtlPolicy::default()));
    let previous = mock.push_gate();

    let load = tokio::spawn({
      let stores = Arc::clone(&stores);
      async move { stores.permissions.fetch_all(false).await }
    });
    while mock.calls() < 1 {
      tokio::task::yield_now().await;
    }

    stores.sign_out();
    previous
      .send(Ok(json!({"myPermissions": [{"id": "p9", "key": "admin.all", "description": null}]})))
      .unwrap();
    load.await.unwrap();

    assert!(stores.cache().is_empty());
    assert!(!stores.permissions.has_permission("admin.all"));
    assert!(!stores.permissions.is_initialized());

    // The next session asks the network again
    let next = mock.push_gate();
    next.send(Ok(json!({"myPermissions": []}))).unwrap();
    stores.permissions.fetch_all(false).await;

    assert_eq!(mock.calls(), 2);
    assert!(!stores.permissions.has_permission("admin.all"));
  }
}
