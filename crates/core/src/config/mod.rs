//! Agent configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LIFERAFT_*)
//! 2. TOML config file (if LIFERAFT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Agent configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LIFERAFT_*)
/// 2. TOML config file (if LIFERAFT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Version tag of this agent revision.
    ///
    /// Names the current cache bucket; every bucket with a different
    /// name is evicted during activation. Set via LIFERAFT_VERSION_TAG.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Origin the agent serves, e.g. `https://app.example.com`.
    ///
    /// Seed paths resolve against it and only responses from this
    /// origin are ever cached. Set via LIFERAFT_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Paths pre-fetched into the bucket at install time.
    ///
    /// Set via LIFERAFT_SEED_PATHS.
    #[serde(default = "default_seed_paths")]
    pub seed_paths: Vec<String>,

    /// Path to the SQLite bucket store.
    ///
    /// Only used by hosts that pick the persistent adapter.
    /// Set via LIFERAFT_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for outgoing requests.
    ///
    /// Set via LIFERAFT_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to accept per response body.
    ///
    /// Set via LIFERAFT_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network request timeout in milliseconds.
    ///
    /// Set via LIFERAFT_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow per request.
    ///
    /// Set via LIFERAFT_MAX_REDIRECTS.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_version_tag() -> String {
    "v1".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_seed_paths() -> Vec<String> {
    vec!["/".into()]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./liferaft-cache.sqlite")
}

fn default_user_agent() -> String {
    "liferaft/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            version_tag: default_version_tag(),
            origin: default_origin(),
            seed_paths: default_seed_paths(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AgentConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin does not parse.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LIFERAFT_`
    /// 2. TOML file from `LIFERAFT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LIFERAFT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LIFERAFT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
