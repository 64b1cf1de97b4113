//! Settings structures for catalog-api configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure, deserialized from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub search: SearchSettings,
    pub cache: CacheSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (CATALOG_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("CATALOG_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("CATALOG_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("CATALOG_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("CATALOG_DATABASE_PATH") {
            self.database.path = val;
        }
        if let Ok(val) = std::env::var("CATALOG_SEED_PATH") {
            self.database.seed_path = Some(PathBuf::from(val));
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.max_take == 0 {
            bail!("search.max_take must be at least 1");
        }
        if search.default_take == 0 || search.default_take > search.max_take {
            bail!(
                "search.default_take must be within 1..={}, got {}",
                search.max_take,
                search.default_take
            );
        }
        if !(search.min_similarity > 0.0 && search.min_similarity <= 1.0) {
            bail!(
                "search.min_similarity must be within (0, 1], got {}",
                search.min_similarity
            );
        }
        if !(search.timeout_secs > 0.0 && search.timeout_secs.is_finite()) {
            bail!("search.timeout_secs must be a positive number of seconds");
        }
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by /health
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "catalog-api".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind_address: String,
    /// Compress responses with gzip
    pub compression: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "127.0.0.1".to_string(),
            compression: true,
        }
    }
}

/// Catalog store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: Backend,
    /// SQLite file path, or `:memory:`
    pub path: String,
    /// JSON catalog file imported at startup
    pub seed_path: Option<PathBuf>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            path: "data/catalog.db".to_string(),
            seed_path: None,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Page size when the request does not give one
    pub default_take: u32,
    /// Upper bound for `take`; larger requests are clamped
    pub max_take: u32,
    /// Minimum trigram similarity for a fuzzy match
    pub min_similarity: f64,
    /// Time limit for each repository query, in seconds
    pub timeout_secs: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_take: 10,
            max_take: 50,
            min_similarity: crate::query::DEFAULT_MIN_SIMILARITY,
            timeout_secs: 5.0,
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 300,
            max_capacity: 10_000,
        }
    }
}
