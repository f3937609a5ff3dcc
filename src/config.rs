//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.flashbook/config.toml` (user)
//! 3. `/etc/flashbook/config.toml` (system)
//!
//! Every section is optional; missing values take the built-in defaults.
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.flashbook/secrets.toml` (user, must be 0600)
//! 2. `/etc/flashbook/secrets.toml` (system, must be 0600)
//!
//! and fall back to the `GEMINI_API_KEY` environment variable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{CacheConfig, StoreBackend};
use crate::generator::{GeminiConfig, RetryConfig};
use crate::summarizer::{Flashbook, FlashbookBuilder};
use crate::types::RequestLimits;
use crate::{FlashbookError, Result};

/// Environment variable consulted when no secrets file provides a key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const CONFIG_DIR: &str = ".flashbook";
const SYSTEM_DIR: &str = "/etc/flashbook";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub limits: RequestLimits,
    #[serde(default)]
    pub retry: RetrySection,
}

/// Gemini generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// Model name (default: gemini-2.5-flash).
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP timeout per request in seconds (default: 60).
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    /// Bound on one whole generation, retries included (default: 180).
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_http_timeout(),
            generation_timeout_secs: default_generation_timeout(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_http_timeout() -> u64 {
    60
}

fn default_generation_timeout() -> u64 {
    180
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_output_tokens() -> u32 {
    4096
}

/// Summary cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSection {
    /// "memory" (default) or "bounded".
    #[serde(default)]
    pub backend: StoreBackend,
    /// Entry lifetime in seconds (default: 86400).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Expiry sweep every N stores (default: 100).
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
    /// Capacity of the bounded backend (default: 10000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            ttl_secs: default_ttl(),
            cleanup_interval: default_cleanup_interval(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl() -> u64 {
    86_400
}

fn default_cleanup_interval() -> u64 {
    100
}

fn default_max_entries() -> u64 {
    10_000
}

/// Retry settings for transient generator errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 3). 1 disables retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.flashbook/config.toml`
    /// 3. `/etc/flashbook/config.toml`
    ///
    /// Falls back to the defaults when no file is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FlashbookError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            FlashbookError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        debug!(path = ?path, "loaded config");
        Ok(config)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(FlashbookError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = Path::new(SYSTEM_DIR).join("config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Reject values that would make the summarizer unusable.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.min_content_chars > limits.max_content_chars {
            return Err(FlashbookError::Configuration(format!(
                "limits.min_content_chars ({}) exceeds limits.max_content_chars ({})",
                limits.min_content_chars, limits.max_content_chars
            )));
        }
        if self.cache.ttl_secs == 0 {
            return Err(FlashbookError::Configuration(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.generator.generation_timeout_secs == 0 {
            return Err(FlashbookError::Configuration(
                "generator.generation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        let g = &self.generator;
        GeminiConfig::new()
            .model(&g.model)
            .base_url(&g.base_url)
            .timeout(Duration::from_secs(g.timeout_secs))
            .temperature(g.temperature)
            .top_p(g.top_p)
            .max_output_tokens(g.max_output_tokens)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .backend(self.cache.backend)
            .ttl(Duration::from_secs(self.cache.ttl_secs))
            .cleanup_interval(self.cache.cleanup_interval)
            .max_entries(self.cache.max_entries)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.retry.max_attempts)
            .initial_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
    }

    /// A builder preloaded with every setting in this config.
    ///
    /// The generator still has to be chosen, typically with
    /// `.gemini(secrets.gemini_api_key()...)`.
    pub fn builder(&self) -> FlashbookBuilder {
        Flashbook::builder()
            .gemini_config(self.gemini_config())
            .cache(self.cache_config())
            .retry(self.retry_config())
            .limits(self.limits.clone())
            .generation_timeout(Duration::from_secs(self.generator.generation_timeout_secs))
    }
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl std::fmt::Debug for ApiKeySecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeySecret")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.flashbook/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/flashbook/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(CONFIG_DIR).join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = Path::new(SYSTEM_DIR).join("secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Parse a secrets file after checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            FlashbookError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            FlashbookError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            FlashbookError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(FlashbookError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Gemini API key from the secrets file, else `GEMINI_API_KEY`.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini
            .as_ref()
            .map(|s| s.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(GEMINI_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}
