//! Configuration for the sift facade.
//!
//! Loaded from a TOML file (default `sift.toml`); every section and field
//! falls back to a usable default so a missing file still yields a working
//! local configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub denoise: DenoiseConfig,
    #[serde(default)]
    pub stout: StoutConfig,
}

impl Config {
    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8090".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Allowed origins. Use "*" for any origin, or list specific origins.
    #[serde(default)]
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            origins: Vec::new(),
        }
    }
}

/// Connection settings for the backing Elasticsearch cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default = "default_true")]
    pub verify_certs: bool,
    pub ca_certs: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_store_host() -> String {
    "localhost".to_string()
}

fn default_store_port() -> u16 {
    9200
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_store_host(),
            port: default_store_port(),
            use_ssl: false,
            verify_certs: true,
            ca_certs: None,
            client_cert: None,
            client_key: None,
            username: None,
            password: None,
        }
    }
}

impl StoreConfig {
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Page size used when the request does not specify one.
    #[serde(default = "default_page_size")]
    pub default_size: usize,
    /// Hard ceiling on the requested page size.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Keep-alive passed to the store when opening a scroll context.
    #[serde(default = "default_scroll_ttl")]
    pub scroll_ttl: String,
    /// Seconds before a cached index mapping is considered stale.
    #[serde(default = "default_metadata_ttl")]
    pub metadata_ttl_secs: u64,
}

fn default_page_size() -> usize {
    100
}

fn default_max_size() -> usize {
    10_000
}

fn default_scroll_ttl() -> String {
    "1m".to_string()
}

fn default_metadata_ttl() -> u64 {
    60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_size: default_page_size(),
            max_size: default_max_size(),
            scroll_ttl: default_scroll_ttl(),
            metadata_ttl_secs: default_metadata_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DenoiseConfig {
    /// Scroll page size used when sweeping an index's raw documents.
    #[serde(default = "default_denoise_batch")]
    pub batch_size: usize,
}

fn default_denoise_batch() -> usize {
    1000
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            batch_size: default_denoise_batch(),
        }
    }
}

/// Feature flag and location of the stout master answer table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoutConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_stout_index")]
    pub index: String,
}

fn default_stout_index() -> String {
    "stout".to_string()
}

impl Default for StoutConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            index: default_stout_index(),
        }
    }
}
