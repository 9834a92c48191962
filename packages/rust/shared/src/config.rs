//! Application configuration for LeadCollector.
//!
//! User config lives at `~/.leadcollector/leadcollector.toml`.
//! CLI flags override environment variables, which override config file
//! values, which override defaults. Credentials are never written to disk:
//! the file only names the environment variables that hold them.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LeadCollectorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadcollector.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadcollector";

/// Accepted bounds for the number of search results to fetch.
pub const MAX_RESULTS_RANGE: RangeInclusive<u32> = 10..=50;

// ---------------------------------------------------------------------------
// GeminiModel
// ---------------------------------------------------------------------------

/// Supported Gemini model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeminiModel {
    #[default]
    #[serde(rename = "models/gemini-1.5-flash-latest")]
    Flash15,
    #[serde(rename = "models/gemini-1.5-pro-latest")]
    Pro15,
    #[serde(rename = "models/gemini-2.0-flash")]
    Flash20,
}

impl GeminiModel {
    /// Every supported model, in display order.
    pub const ALL: [GeminiModel; 3] = [Self::Flash15, Self::Pro15, Self::Flash20];

    /// Resource name as used in the `generateContent` path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash15 => "models/gemini-1.5-flash-latest",
            Self::Pro15 => "models/gemini-1.5-pro-latest",
            Self::Flash20 => "models/gemini-2.0-flash",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeminiModel {
    type Err = LeadCollectorError;

    /// Accepts the full resource name or the bare model name
    /// (`gemini-2.0-flash`).
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| {
                let id = m.as_str();
                id == wanted || id.trim_start_matches("models/") == wanted
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                LeadCollectorError::validation(format!(
                    "unsupported model '{wanted}': expected one of {}",
                    known.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Config structs (matching leadcollector.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// SerpAPI settings.
    #[serde(default)]
    pub serpapi: SerpApiConfig,

    /// Gemini settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Page text extraction settings.
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Minimum relevance score for a qualified lead.
    #[serde(default = "default_min_score")]
    pub min_score: u8,

    /// Number of search results to request.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Model used for scoring.
    #[serde(default)]
    pub model: GeminiModel,

    /// Pause between candidates to stay under provider rate limits.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
            model: GeminiModel::default(),
            request_delay_ms: default_request_delay(),
        }
    }
}

fn default_min_score() -> u8 {
    45
}
fn default_max_results() -> u32 {
    30
}
fn default_request_delay() -> u64 {
    200
}

/// `[serpapi]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpApiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_serpapi_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_serpapi_key_env(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_serpapi_key_env() -> String {
    "SERPAPI_API_KEY".into()
}
fn default_search_timeout() -> u64 {
    30
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_score_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            timeout_secs: default_score_timeout(),
        }
    }
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_score_timeout() -> u64 {
    60
}

/// `[scraper]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_scrape_timeout(),
        }
    }
}

fn default_scrape_timeout() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + env + CLI flags)
// ---------------------------------------------------------------------------

/// Per-invocation settings handed to the pipeline. Never persisted.
#[derive(Clone)]
pub struct RunConfig {
    pub serpapi_key: String,
    pub gemini_key: String,
    pub model: GeminiModel,
    /// Minimum relevance score (0–100) for a qualified lead.
    pub min_score: u8,
    /// Number of search results to request (10–50).
    pub max_results: u32,
    /// Pause inserted after each scored candidate.
    pub request_delay: Duration,
    pub scrape_timeout: Duration,
    pub search_timeout: Duration,
    pub score_timeout: Duration,
}

impl From<&AppConfig> for RunConfig {
    /// Credentials start empty; the caller resolves them.
    fn from(config: &AppConfig) -> Self {
        Self {
            serpapi_key: String::new(),
            gemini_key: String::new(),
            model: config.defaults.model,
            min_score: config.defaults.min_score,
            max_results: config.defaults.max_results,
            request_delay: Duration::from_millis(config.defaults.request_delay_ms),
            scrape_timeout: Duration::from_secs(config.scraper.timeout_secs),
            search_timeout: Duration::from_secs(config.serpapi.timeout_secs),
            score_timeout: Duration::from_secs(config.gemini.timeout_secs),
        }
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("serpapi_key", &redacted(&self.serpapi_key))
            .field("gemini_key", &redacted(&self.gemini_key))
            .field("model", &self.model)
            .field("min_score", &self.min_score)
            .field("max_results", &self.max_results)
            .field("request_delay", &self.request_delay)
            .field("scrape_timeout", &self.scrape_timeout)
            .field("search_timeout", &self.search_timeout)
            .field("score_timeout", &self.score_timeout)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadcollector/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadCollectorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadcollector/leadcollector.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content =
        std::fs::read_to_string(path).map_err(|e| LeadCollectorError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LeadCollectorError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadCollectorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadCollectorError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadCollectorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Pick an API key: an explicit non-blank value wins, else the named env var.
///
/// Returns an empty string when neither is set; the pipeline rejects that
/// during validation.
pub fn resolve_api_key(explicit: Option<&str>, env_var: &str) -> String {
    match explicit.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => std::env::var(env_var)
            .map(|v| v.trim().to_string())
            .unwrap_or_default(),
    }
}
