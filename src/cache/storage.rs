//! Cache storage trait and its backends.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use lru::LruCache;
use rusqlite::{params, OptionalExtension};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::db::Database;

use super::entry::{CacheEntry, Fingerprint};

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Look up an entry, expired or not. Freshness is the caller's call.
  fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

  /// Store an entry, replacing any previous one for the fingerprint.
  fn put(&self, fingerprint: Fingerprint, entry: CacheEntry) -> Result<()>;

  /// Drop one entry. Returns whether it existed.
  fn remove(&self, fingerprint: &Fingerprint) -> Result<bool>;

  /// Drop every entry expired at `now`. Returns how many were removed.
  fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize>;

  fn clear(&self) -> Result<()>;

  fn len(&self) -> Result<usize>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
    Ok(None) // Always miss
  }

  fn put(&self, _fingerprint: Fingerprint, _entry: CacheEntry) -> Result<()> {
    Ok(()) // Discard
  }

  fn remove(&self, _fingerprint: &Fingerprint) -> Result<bool> {
    Ok(false)
  }

  fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<usize> {
    Ok(0)
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }

  fn len(&self) -> Result<usize> {
    Ok(0)
  }
}

/// Bounded in-memory storage. The least recently used entry is evicted once
/// `capacity` is reached.
pub struct MemoryStorage {
  entries: Mutex<LruCache<Fingerprint, CacheEntry>>,
}

impl MemoryStorage {
  pub const DEFAULT_CAPACITY: usize = 512;

  /// `capacity` of zero is bumped to one.
  pub fn new(capacity: usize) -> Self {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
    Self {
      entries: Mutex::new(LruCache::new(capacity)),
    }
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<Fingerprint, CacheEntry>>> {
    self.entries.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl Default for MemoryStorage {
  fn default() -> Self {
    Self::new(Self::DEFAULT_CAPACITY)
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
    Ok(self.lock()?.get(fingerprint).cloned())
  }

  fn put(&self, fingerprint: Fingerprint, entry: CacheEntry) -> Result<()> {
    self.lock()?.put(fingerprint, entry);
    Ok(())
  }

  fn remove(&self, fingerprint: &Fingerprint) -> Result<bool> {
    Ok(self.lock()?.pop(fingerprint).is_some())
  }

  fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
    let mut entries = self.lock()?;
    let expired: Vec<Fingerprint> = entries
      .iter()
      .filter(|(_, entry)| entry.is_expired(now))
      .map(|(key, _)| key.clone())
      .collect();

    for key in &expired {
      entries.pop(key);
    }

    Ok(expired.len())
  }

  fn clear(&self) -> Result<()> {
    self.lock()?.clear();
    Ok(())
  }

  fn len(&self) -> Result<usize> {
    Ok(self.lock()?.len())
  }
}

/// SQLite-backed storage, for responses that should survive a restart.
pub struct SqliteStorage {
  db: Database,
}

impl SqliteStorage {
  pub fn new(db: Database) -> Self {
    Self { db }
  }
}

impl CacheStorage for SqliteStorage {
  fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
    let conn = self.db.conn()?;

    let row: Option<(Vec<u8>, i64, i64)> = conn
      .query_row(
        "SELECT data, cached_at, expires_at FROM response_cache WHERE fingerprint = ?",
        params![fingerprint.as_str()],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    match row {
      Some((data, cached_at, expires_at)) => {
        let value = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize cache entry: {}", e))?;
        Ok(Some(CacheEntry {
          value,
          cached_at: from_millis(cached_at)?,
          expires_at: from_millis(expires_at)?,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, fingerprint: Fingerprint, entry: CacheEntry) -> Result<()> {
    let data =
      serde_json::to_vec(&entry.value).map_err(|e| eyre!("Failed to serialize entry: {}", e))?;

    self
      .db
      .conn()?
      .execute(
        "INSERT OR REPLACE INTO response_cache (fingerprint, data, cached_at, expires_at)
         VALUES (?, ?, ?, ?)",
        params![
          fingerprint.as_str(),
          data,
          entry.cached_at.timestamp_millis(),
          entry.expires_at.timestamp_millis()
        ],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }

  fn remove(&self, fingerprint: &Fingerprint) -> Result<bool> {
    let removed = self
      .db
      .conn()?
      .execute(
        "DELETE FROM response_cache WHERE fingerprint = ?",
        params![fingerprint.as_str()],
      )
      .map_err(|e| eyre!("Failed to delete cache entry: {}", e))?;

    Ok(removed > 0)
  }

  fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
    self
      .db
      .conn()?
      .execute(
        "DELETE FROM response_cache WHERE expires_at < ?",
        params![now.timestamp_millis()],
      )
      .map_err(|e| eyre!("Failed to sweep cache: {}", e))
  }

  fn clear(&self) -> Result<()> {
    self
      .db
      .conn()?
      .execute("DELETE FROM response_cache", [])
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;
    Ok(())
  }

  fn len(&self) -> Result<usize> {
    let count: i64 = self
      .db
      .conn()?
      .query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count cache entries: {}", e))?;
    Ok(count as usize)
  }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| eyre!("Invalid timestamp {}", ms))
}
