/// Schema for the local database.
pub const SCHEMA: &str = r#"
-- Cached GraphQL responses keyed by request fingerprint
CREATE TABLE IF NOT EXISTS response_cache (
    fingerprint TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    cached_at INTEGER NOT NULL,   -- unix millis
    expires_at INTEGER NOT NULL   -- unix millis
);

CREATE INDEX IF NOT EXISTS idx_response_cache_expires
    ON response_cache(expires_at);

-- Local key-value preferences (language, theme)
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
