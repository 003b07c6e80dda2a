//! Defaults and file configuration for the recommendation pipeline.

use crate::aliases::AliasTable;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Filtering
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.6;
pub const DEFAULT_TOP_N: usize = 5;

// AI service
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Model value that asks the provider to discover a usable model.
pub const AUTO_MODEL: &str = "auto";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 256;
// Generation replies carry full recipes
pub const GENERATE_MAX_OUTPUT_TOKENS: u32 = 2048;
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const MAX_GENERATED_RECIPES: usize = 5;

// Files
pub const DEFAULT_DATASET_PATH: &str = "data/recipes.csv";
pub const CONFIG_PATH_ENV: &str = "COOKMATCH_CONFIG";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub threshold: f64,
    pub top_n: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OVERLAP_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// When false the ranker always uses the deterministic pick.
    pub enabled: bool,
    /// API root; override for proxies or regional endpoints.
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    /// Retry once on transient failures before falling back.
    pub retry: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: true,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// File-level configuration. Every field is optional in the TOML.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: PathBuf,
    /// Replacement alias table; the built-in table is used when unset.
    pub aliases: Option<PathBuf>,
    pub filter: FilterConfig,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET_PATH),
            aliases: None,
            filter: FilterConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Explicit path, then `COOKMATCH_CONFIG`, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.filter.threshold) {
            return Err(ConfigError::Invalid(format!(
                "filter.threshold must be within 0.0..=1.0, got {}",
                self.filter.threshold
            )));
        }
        if self.filter.top_n == 0 {
            return Err(ConfigError::Invalid("filter.top_n must be at least 1".to_string()));
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::Invalid("ai.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// For operations that have no deterministic fallback.
    pub fn require_ai(&self, operation: &str) -> Result<(), ConfigError> {
        if self.ai.enabled {
            return Ok(());
        }
        Err(ConfigError::Invalid(format!(
            "{} needs the AI service, but ai.enabled = false",
            operation
        )))
    }

    /// The configured alias file, or the built-in table.
    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        match &self.aliases {
            Some(path) => AliasTable::load(path),
            None => Ok(AliasTable::builtin()),
        }
    }
}

/// Reads the Gemini API key. Missing or blank is a startup error.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    match std::env::var(GEMINI_API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::MissingEnvVar(GEMINI_API_KEY_ENV.to_string())),
    }
}
