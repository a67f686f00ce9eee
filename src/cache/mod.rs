//! Response cache in front of the GraphQL client.
//!
//! Responses are memoized by request fingerprint with a per-call TTL:
//! - a fresh entry is served without touching the network
//! - `ttl = 0` bypasses the cache entirely (mutations, tracking calls)
//! - failures are never cached
//! - concurrent identical requests share a single in-flight call
//!
//! Storage is pluggable: bounded in-memory LRU, SQLite for persistence across
//! restarts, or a no-op backend when caching is disabled.

mod entry;
mod layer;
mod storage;

pub use entry::{CacheEntry, CacheResult, CacheSource, FetchOptions, Fingerprint};
pub use layer::CacheLayer;
pub use storage::{CacheStorage, MemoryStorage, NoopStorage, SqliteStorage};
