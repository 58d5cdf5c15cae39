//! Configuration management for socialgraph.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`SOCIALGRAPH` prefix, `__` separator,
//!    e.g. `SOCIALGRAPH__STORE__URL`)
//! 2. Config file (`socialgraph.toml` unless another prefix is given)
//! 3. Defaults

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Source;

pub const ENV_PREFIX: &str = "SOCIALGRAPH";
pub const DEFAULT_FILE_PREFIX: &str = "socialgraph";

/// Top-level settings for every socialgraph component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(
            store = %settings.store.url,
            source = %settings.source.base_url,
            friend_concurrency = settings.crawl.friend_concurrency,
            "Configuration loaded"
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawl.retry_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "crawl.retry_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.crawl.friend_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "crawl.friend_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.source.source()?;
        Ok(())
    }
}

// ── Graph store ───────────────────────────────────────────────────

/// Connection settings for the graph store's query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store (e.g. `http://0.0.0.0:8080`).
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Header carrying the store credential.
    #[serde(default = "default_auth_header_name")]
    pub auth_header_name: String,

    /// Store credential. Left off the request entirely when empty.
    #[serde(default)]
    pub auth_token: String,

    /// Path of the health endpoint probed before any query is sent.
    #[serde(default = "default_health_path")]
    pub health_path: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl StoreConfig {
    pub fn graphql_url(&self) -> String {
        self.join("/graphql")
    }

    pub fn health_url(&self) -> String {
        self.join(&self.health_path)
    }

    pub fn admin_schema_url(&self) -> String {
        self.join("/admin/schema")
    }

    pub fn alter_url(&self) -> String {
        self.join("/alter")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            auth_header_name: default_auth_header_name(),
            auth_token: String::new(),
            health_path: default_health_path(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Source API ────────────────────────────────────────────────────

/// Settings for the external social-network API.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_base_url")]
    pub base_url: String,

    /// Bearer credential for the source API.
    #[serde(default)]
    pub token: String,

    /// Tag stored on every Person created from this source.
    #[serde(default = "default_source_tag")]
    pub source_tag: String,

    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,
}

impl SourceConfig {
    pub fn source(&self) -> Result<Source, ConfigError> {
        self.source_tag.parse()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            token: String::new(),
            source_tag: default_source_tag(),
            connect_timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
        }
    }
}

// ── Crawl ─────────────────────────────────────────────────────────

/// Knobs for a single crawl run.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Overall deadline for one crawl, readiness wait included.
    #[serde(default = "default_timeout_secs")]
    pub deadline_secs: u64,

    /// Upper bound on the readiness wait.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// Pause between readiness probes.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Friend profiles fetched at once. 1 keeps the fetch strictly sequential.
    #[serde(default = "default_friend_concurrency")]
    pub friend_concurrency: usize,

    /// Store resolved friends as standalone Person nodes.
    #[serde(default = "default_true")]
    pub persist_friends: bool,
}

impl CrawlConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_timeout_secs(),
            ready_timeout_secs: default_ready_timeout_secs(),
            retry_interval_ms: default_retry_interval_ms(),
            friend_concurrency: default_friend_concurrency(),
            persist_friends: default_true(),
        }
    }
}

fn default_store_url() -> String {
    "http://0.0.0.0:8080".to_string()
}

fn default_auth_header_name() -> String {
    "X-Travel-Auth".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_source_base_url() -> String {
    "https://api.twitter.com/1.1".to_string()
}

fn default_source_tag() -> String {
    "twitter".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ready_timeout_secs() -> u64 {
    20
}

fn default_retry_interval_ms() -> u64 {
    500
}

fn default_pool_max_idle() -> usize {
    100
}

fn default_pool_idle_timeout_secs() -> u64 {
    90
}

fn default_friend_concurrency() -> usize {
    1
}

fn default_true() -> bool {
    true
}
