//! Configuration infrastructure
//!
//! Contains configuration loading and management for the wine crawler.
//!
//! Configuration is organized into three sections:
//! 1. Crawler behaviour (pagination cap, split granularity, repeat detection)
//! 2. Search filters (country codes, wine types)
//! 3. Logging

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::seen_set::RepeatKey;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Crawl algorithm settings
    pub crawler: CrawlerConfig,

    /// Search filters applied to every request
    pub filters: FilterConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawl algorithm and transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// API root, endpoints are resolved against it
    pub base_url: String,

    /// Matches returned per search page
    pub records_per_page: u32,

    /// Maximum match count the API paginates through for one filter combination
    pub result_window_cap: u64,

    /// Ranges narrower than this are never split
    pub min_range_width: f64,

    /// Upper bound of the initial price domain
    pub price_max: f64,

    /// Consecutive all-seen pages that terminate a leaf range
    pub duplicate_page_threshold: u32,

    /// Identity used for repeat-page detection
    pub repeat_key: RepeatKey,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Pause after each request in milliseconds (0 = none)
    pub request_delay_ms: u64,

    /// User agent string
    pub user_agent: String,

    /// Persist the first tastes / reviews payload of the run
    pub debug_dumps: bool,
}

/// Search filters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// `country_codes[]` values, e.g. "fr"
    pub country_codes: Vec<String>,

    /// `wine_type_ids[]` values (1 = red)
    pub wine_type_ids: Vec<u32>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Log file name
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: vivino::BASE_URL.to_string(),
            records_per_page: defaults::RECORDS_PER_PAGE,
            result_window_cap: defaults::RESULT_WINDOW_CAP,
            min_range_width: defaults::MIN_RANGE_WIDTH,
            price_max: defaults::PRICE_MAX,
            duplicate_page_threshold: defaults::DUPLICATE_PAGE_THRESHOLD,
            repeat_key: RepeatKey::default(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            user_agent: defaults::USER_AGENT.to_string(),
            debug_dumps: defaults::DEBUG_DUMPS,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            country_codes: Vec::new(),
            wine_type_ids: vec![vivino::RED_WINE_TYPE_ID],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("vivino-harvest");

        Ok(config_dir)
    }

    /// Create a configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.json");
        Ok(Self { config_path })
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { config_path: path.into() }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;

                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Vivino API endpoints and filter identifiers
pub mod vivino {
    /// API root
    pub const BASE_URL: &str = "https://www.vivino.com/api/";

    /// Search endpoint, relative to `BASE_URL`
    pub const EXPLORE_PATH: &str = "explore/explore";

    /// Wine type id for red wines
    pub const RED_WINE_TYPE_ID: u32 = 1;

    /// Taste profile endpoint for a wine
    pub fn tastes_path(wine_id: u64) -> String {
        format!("wines/{}/tastes", wine_id)
    }

    /// Reviews endpoint for a wine
    pub fn reviews_path(wine_id: u64) -> String {
        format!("wines/{}/reviews", wine_id)
    }
}

/// Default crawling configuration values
pub mod defaults {
    /// Default matches per search page
    pub const RECORDS_PER_PAGE: u32 = 25;

    /// Default result-window cap of the search API
    pub const RESULT_WINDOW_CAP: u64 = 2000;

    /// Default minimum splittable range width (currency units)
    pub const MIN_RANGE_WIDTH: f64 = 0.02;

    /// Default upper bound of the price domain
    pub const PRICE_MAX: f64 = 50_000.0;

    /// Default consecutive repeat pages before a leaf is abandoned
    pub const DUPLICATE_PAGE_THRESHOLD: u32 = 5;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default delay after each request in milliseconds
    pub const REQUEST_DELAY_MS: u64 = 0;

    /// Default user agent
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    /// Default debug dump setting
    pub const DEBUG_DUMPS: bool = true;

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = false;

    /// Default log file name
    pub const LOG_FILE_NAME: &str = "vivino-harvest.log";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_api_limits() {
        let config = AppConfig::default();
        assert_eq!(config.crawler.records_per_page, 25);
        assert_eq!(config.crawler.result_window_cap, 2000);
        assert_eq!(config.crawler.duplicate_page_threshold, 5);
        assert_eq!(config.crawler.repeat_key, RepeatKey::Wine);
        assert_eq!(config.filters.wine_type_ids, vec![1]);
        assert!(config.filters.country_codes.is_empty());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let json = r#"{"crawler": {"price_max": 500.0, "repeat_key": "wine_vintage"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.crawler.price_max, 500.0);
        assert_eq!(config.crawler.repeat_key, RepeatKey::WineVintage);
        assert_eq!(config.crawler.records_per_page, defaults::RECORDS_PER_PAGE);
        assert_eq!(config.logging.level, "info");
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.crawler.result_window_cap, defaults::RESULT_WINDOW_CAP);
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn test_corrupted_file_is_backed_up_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await.unwrap();

        assert_eq!(config.crawler.records_per_page, defaults::RECORDS_PER_PAGE);
        assert!(dir.path().join("config.json.corrupted").exists());
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let mut config = AppConfig::default();
        config.filters.country_codes = vec!["pt".to_string()];
        config.crawler.min_range_width = 0.5;
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.filters.country_codes, vec!["pt".to_string()]);
        assert_eq!(loaded.crawler.min_range_width, 0.5);
    }
}
