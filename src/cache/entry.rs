//! Core types for the caching system.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

use crate::graphql::GraphqlRequest;

/// Stable cache key for a request: SHA-256 of the canonical JSON form of
/// `{query, variables}`.
///
/// Object keys are sorted before hashing, so the same variables produce the
/// same fingerprint whatever order they were built in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
  pub fn of(request: &GraphqlRequest) -> Self {
    let canonical = canonicalize(&serde_json::json!({
      "query": request.query.trim(),
      "variables": request.variables,
    }));

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    Self(hex::encode(hasher.finalize()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Short form is enough to tell entries apart in logs
    f.write_str(&self.0[..self.0.len().min(12)])
  }
}

fn canonicalize(value: &Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut entries: Vec<_> = map.iter().collect();
      entries.sort_by(|a, b| a.0.cmp(b.0));
      Value::Object(
        entries
          .into_iter()
          .map(|(k, v)| (k.clone(), canonicalize(v)))
          .collect(),
      )
    }
    Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
    other => other.clone(),
  }
}

/// A memoized response.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  pub value: Value,
  pub cached_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
  /// Entry cached now, expiring after `ttl`.
  pub fn new(value: Value, ttl: Duration) -> Self {
    let now = Utc::now();
    let expires_at = chrono::Duration::from_std(ttl)
      .ok()
      .and_then(|ttl| now.checked_add_signed(ttl))
      .unwrap_or(DateTime::<Utc>::MAX_UTC);

    Self {
      value,
      cached_at: now,
      expires_at,
    }
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }
}

/// Per-call cache policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
  /// How long a successful response stays fresh. Zero disables caching.
  pub ttl: Duration,
}

impl FetchOptions {
  pub fn ttl(ttl: Duration) -> Self {
    Self { ttl }
  }

  /// Always hit the network and never store the response.
  pub fn no_cache() -> Self {
    Self { ttl: Duration::ZERO }
  }

  pub fn is_cacheable(&self) -> bool {
    !self.ttl.is_zero()
  }
}

impl Default for FetchOptions {
  fn default() -> Self {
    Self::ttl(Duration::from_secs(60))
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  pub fn coalesced(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Coalesced,
      cached_at: None,
    }
  }
}

/// Indicates where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// This call went to the network
  Network,
  /// Served from a fresh cache entry
  Cache,
  /// Joined another caller's in-flight request
  Coalesced,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_fingerprint_ignores_key_order() {
    let mut a = serde_json::Map::new();
    a.insert("first".into(), json!(1));
    a.insert("second".into(), json!({"y": 2, "x": 1}));
    let mut b = serde_json::Map::new();
    b.insert("second".into(), json!({"x": 1, "y": 2}));
    b.insert("first".into(), json!(1));

    let fa = Fingerprint::of(&GraphqlRequest::new("query Q { q }", Value::Object(a)));
    let fb = Fingerprint::of(&GraphqlRequest::new("query Q { q }", Value::Object(b)));
    assert_eq!(fa, fb);
  }

  #[test]
  fn test_fingerprint_distinguishes_variables() {
    let fa = Fingerprint::of(&GraphqlRequest::new("{ q }", json!({"id": "1"})));
    let fb = Fingerprint::of(&GraphqlRequest::new("{ q }", json!({"id": "2"})));
    assert_ne!(fa, fb);
  }

  #[test]
  fn test_fingerprint_trims_query() {
    let fa = Fingerprint::of(&GraphqlRequest::new("  { q }\n", json!({})));
    let fb = Fingerprint::of(&GraphqlRequest::new("{ q }", Value::Null));
    assert_eq!(fa, fb);
    assert_eq!(fa.as_str().len(), 64);
  }

  #[test]
  fn test_entry_expiry() {
    let entry = CacheEntry::new(json!(1), Duration::from_secs(60));
    assert!(!entry.is_expired(Utc::now()));
    assert!(entry.is_expired(Utc::now() + chrono::Duration::seconds(61)));
  }

  #[test]
  fn test_huge_ttl_saturates() {
    let entry = CacheEntry::new(json!(1), Duration::MAX);
    assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
  }
}
