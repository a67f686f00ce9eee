use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_GRAPHQL_ENDPOINT: &str = "SOUK_GRAPHQL_ENDPOINT";
pub const ENV_API_URL: &str = "SOUK_API_URL";
pub const ENV_SITE_URL: &str = "SOUK_SITE_URL";
pub const ENV_API_TOKEN: &str = "SOUK_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
  pub api: ApiConfig,
  pub cache: CacheConfig,
  pub ttl: TtlPolicy,
  /// Where the cache database and preferences live (defaults to the XDG data dir)
  pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub graphql_endpoint: Url,
  /// Base REST URL used for server-side fetches
  pub base_url: Option<Url>,
  /// Public site URL used for generated metadata
  pub site_url: Option<Url>,
  /// Request timeout in seconds; 0 disables the timeout
  pub timeout_secs: Option<u64>,
  /// Bearer token, only ever read from the environment
  pub token: Option<String>,
}

impl ApiConfig {
  pub fn new(graphql_endpoint: Url) -> Self {
    Self {
      graphql_endpoint,
      base_url: None,
      site_url: None,
      timeout_secs: None,
      token: None,
    }
  }

  pub fn timeout(&self) -> Option<Duration> {
    match self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
      0 => None,
      secs => Some(Duration::from_secs(secs)),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Maximum number of in-memory entries before LRU eviction
  pub capacity: usize,
  /// Keep cached responses in SQLite across restarts
  pub persist: bool,
  /// Seconds between sweeps of expired entries; 0 disables sweeping
  pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      capacity: 512,
      persist: false,
      sweep_interval_secs: 300,
    }
  }
}

impl CacheConfig {
  pub fn sweep_interval(&self) -> Option<Duration> {
    match self.sweep_interval_secs {
      0 => None,
      secs => Some(Duration::from_secs(secs)),
    }
  }
}

/// Per-store TTL overrides in milliseconds, keyed by store kind (e.g. "categories").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "BTreeMap<String, u64>")]
pub struct TtlPolicy {
  overrides: BTreeMap<String, u64>,
}

impl From<BTreeMap<String, u64>> for TtlPolicy {
  fn from(raw: BTreeMap<String, u64>) -> Self {
    Self {
      overrides: raw.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
    }
  }
}

impl TtlPolicy {
  pub fn with_override(mut self, kind: &str, millis: u64) -> Self {
    self.overrides.insert(kind.to_lowercase(), millis);
    self
  }

  pub fn ttl_for(&self, kind: &str, default: Duration) -> Duration {
    self
      .overrides
      .get(kind)
      .map(|ms| Duration::from_millis(*ms))
      .unwrap_or(default)
  }
}

/// On-disk shape; every field is optional so the environment can fill the gaps.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
  #[serde(default)]
  api: ApiFile,
  #[serde(default)]
  cache: CacheConfig,
  #[serde(default)]
  ttl: TtlPolicy,
  data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiFile {
  graphql_endpoint: Option<String>,
  base_url: Option<String>,
  site_url: Option<String>,
  timeout_secs: Option<u64>,
}

impl Config {
  /// Load configuration from file and environment.
  ///
  /// File search order:
  /// 1. Explicit path if provided
  /// 2. ./souk.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/souk/config.yaml
  ///
  /// A missing file is fine as long as `SOUK_GRAPHQL_ENDPOINT` is set.
  /// Environment variables always override file values.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let file = Self::load_file(explicit_path)?;
    Self::resolve(file, |key| std::env::var(key).ok())
  }

  /// Data directory from the config file alone, for commands that never
  /// talk to the API. Unlike [`load`](Self::load) it needs no endpoint.
  pub fn load_data_dir(explicit_path: Option<&Path>) -> Result<PathBuf> {
    match Self::load_file(explicit_path)?.data_dir {
      Some(dir) => Ok(dir),
      None => Self::default_data_dir(),
    }
  }

  fn load_file(explicit_path: Option<&Path>) -> Result<ConfigFile> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::read_file(&p),
      None => Ok(ConfigFile::default()),
    }
  }

  /// Parse YAML text and resolve it against the given environment lookup.
  pub fn from_yaml<F>(contents: &str, env: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let file: ConfigFile =
      serde_yaml::from_str(contents).map_err(|e| eyre!("Failed to parse config: {}", e))?;
    Self::resolve(file, env)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("souk.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("souk").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn read_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn resolve<F>(file: ConfigFile, env: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let endpoint = env(ENV_GRAPHQL_ENDPOINT)
      .or(file.api.graphql_endpoint)
      .ok_or_else(|| {
        eyre!(
          "No GraphQL endpoint configured. Set {} or api.graphql_endpoint in souk.yaml.",
          ENV_GRAPHQL_ENDPOINT
        )
      })?;

    let api = ApiConfig {
      base_url: env(ENV_API_URL)
        .or(file.api.base_url)
        .map(|u| parse_url("API URL", &u))
        .transpose()?,
      site_url: env(ENV_SITE_URL)
        .or(file.api.site_url)
        .map(|u| parse_url("site URL", &u))
        .transpose()?,
      timeout_secs: file.api.timeout_secs,
      token: env(ENV_API_TOKEN).filter(|t| !t.is_empty()),
      ..ApiConfig::new(parse_url("graphql endpoint", &endpoint)?)
    };

    if file.cache.capacity == 0 {
      return Err(eyre!("cache.capacity must be at least 1"));
    }

    Ok(Self {
      api,
      cache: file.cache,
      ttl: file.ttl,
      data_dir: file.data_dir,
    })
  }

  /// Directory holding the cache database and preferences.
  pub fn data_dir(&self) -> Result<PathBuf> {
    match &self.data_dir {
      Some(dir) => Ok(dir.clone()),
      None => Self::default_data_dir(),
    }
  }

  /// `$XDG_DATA_HOME/souk`, falling back to `~/.local/share/souk`.
  pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("souk"))
  }
}

fn parse_url(what: &str, value: &str) -> Result<Url> {
  Url::parse(value.trim()).map_err(|e| eyre!("Invalid {} '{}': {}", what, value, e))
}
