//! Resolver configuration
//!
//! Parsed once at startup and threaded explicitly into the components;
//! nothing reads configuration from ambient state afterwards.

use crate::cache::{CacheError, CacheStore, MemoryStore, OpenStore, ResultCache, SqliteStore};
use crate::resolve::{Resolver, ResolverOptions, DEFAULT_MAX_PASSES, DEFAULT_MODULE_NAME, DEFAULT_TITLE_SLOP};
use crate::search::{HttpSearchProvider, ProviderError, SearchGateway, SearchProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the path of the configuration file
pub const CONFIG_ENV: &str = "BIBRESOLVE_CONFIG";

/// Errors raised while loading or applying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no configuration: set {0} or pass a path")]
    MissingEnv(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("cannot open cache: {0}")]
    Cache(#[from] CacheError),

    #[error("cannot create search client: {0}")]
    Provider(#[from] ProviderError),
}

/// Where cached search results are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// SQLite file; defaults to the user cache directory
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            path: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// Default SQLite location (~/.cache/bibresolve/cache.db)
    pub fn default_path() -> PathBuf {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".cache"));
        cache_dir.join("bibresolve").join("cache.db")
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Open the configured backend
    pub fn open_store(&self) -> Result<Arc<dyn CacheStore>, CacheError> {
        match self.backend {
            CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            CacheBackend::Sqlite => {
                let path = self.path.clone().unwrap_or_else(Self::default_path);
                Ok(Arc::new(SqliteStore::open(path)?))
            }
        }
    }

    /// Drop expired entries from a persistent backend.
    ///
    /// A memory backend starts empty in every process, so there is nothing
    /// to purge.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        match self.backend {
            CacheBackend::Memory => Ok(0),
            CacheBackend::Sqlite => {
                let path = self.path.clone().unwrap_or_else(Self::default_path);
                SqliteStore::open(path)?.purge_expired()
            }
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URLs of the search endpoints, queried in this order
    pub apis: Vec<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_title_slop")]
    pub title_slop: u32,
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    #[serde(default = "default_module_name")]
    pub module_name: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_ttl_secs() -> u64 {
    86_400
}

fn default_title_slop() -> u32 {
    DEFAULT_TITLE_SLOP
}

fn default_max_passes() -> usize {
    DEFAULT_MAX_PASSES
}

fn default_module_name() -> String {
    DEFAULT_MODULE_NAME.to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Config {
    /// Configuration with defaults for everything but the endpoints
    pub fn new(apis: Vec<String>) -> Self {
        Self {
            apis,
            cache: CacheConfig::default(),
            title_slop: default_title_slop(),
            max_passes: default_max_passes(),
            module_name: default_module_name(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.yaml`/`.yml` files are YAML, anything else JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Load from the file named by [`CONFIG_ENV`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV).ok_or(ConfigError::MissingEnv(CONFIG_ENV))?;
        Self::load(PathBuf::from(path))
    }

    /// Load from `path` if given, otherwise from the environment
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.apis.is_empty() {
            return Err(ConfigError::Invalid("`apis` must list at least one endpoint".into()));
        }
        if let Some(api) = self.apis.iter().find(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("empty endpoint {:?}", api)));
        }
        if self.max_passes == 0 {
            return Err(ConfigError::Invalid("`max_passes` must be positive".into()));
        }
        Ok(())
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            module_name: self.module_name.clone(),
            title_slop: self.title_slop,
            max_passes: self.max_passes,
        }
    }

    /// Wire a resolver over the given provider and cache store
    pub fn build_resolver_with(
        &self,
        provider: Arc<dyn SearchProvider>,
        store: Arc<dyn CacheStore>,
    ) -> Resolver {
        let cache = ResultCache::new(store, self.cache.ttl());
        let gateway = SearchGateway::new(provider, cache, self.apis.clone());
        Resolver::new(gateway, self.resolver_options())
    }

    /// Wire a resolver over HTTP and the configured cache backend
    pub fn build_resolver(&self) -> Result<Resolver, ConfigError> {
        let provider = HttpSearchProvider::with_timeouts(
            Duration::from_millis(self.connect_timeout_ms),
            Duration::from_millis(self.request_timeout_ms),
        )?;
        let store = self.cache.open_store()?;
        Ok(self.build_resolver_with(Arc::new(provider), store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults() {
        let config = Config::from_json_str(r#"{"apis": ["http://api.archives-ouvertes.fr"]}"#).unwrap();

        assert_eq!(config, Config::new(vec!["http://api.archives-ouvertes.fr".to_string()]));
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.cache.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.title_slop, 3);
        assert_eq!(config.module_name, "HAL");
    }

    #[test]
    fn yaml_overrides() {
        let config = Config::from_yaml_str(
            r#"
apis:
  - http://a.example.org
  - http://b.example.org
cache:
  backend: memory
  ttl_secs: 60
title_slop: 1
max_passes: 4
module_name: scholar
"#,
        )
        .unwrap();

        assert_eq!(config.apis.len(), 2);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        let options = config.resolver_options();
        assert_eq!(options.title_slop, 1);
        assert_eq!(options.max_passes, 4);
        assert_eq!(options.module_name, "scholar");
    }

    #[test]
    fn rejects_empty_apis() {
        let err = Config::from_json_str(r#"{"apis": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_passes() {
        let err = Config::from_json_str(r#"{"apis": ["http://a"], "max_passes": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_missing_apis() {
        let err = Config::from_json_str(r#"{"memcached": ["127.0.0.1"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("config.yml");
        std::fs::write(&yaml, "apis: [\"http://a.example.org\"]\n").unwrap();
        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"apis": ["http://b.example.org"]}"#).unwrap();

        assert_eq!(Config::load(&yaml).unwrap().apis, vec!["http://a.example.org"]);
        assert_eq!(Config::load(&json).unwrap().apis, vec!["http://b.example.org"]);

        let err = Config::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn opens_sqlite_store_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheConfig {
            backend: CacheBackend::Sqlite,
            path: Some(dir.path().join("sub").join("cache.db")),
            ttl_secs: 10,
        };

        cache.open_store().unwrap();
        assert!(dir.path().join("sub").join("cache.db").exists());
        assert_eq!(cache.purge_expired().unwrap(), 0);
    }

    #[test]
    fn memory_backend_has_nothing_to_purge() {
        let cache = CacheConfig {
            backend: CacheBackend::Memory,
            ..CacheConfig::default()
        };
        assert_eq!(cache.purge_expired().unwrap(), 0);
    }
}
