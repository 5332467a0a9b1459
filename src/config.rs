use crate::constants::{
    DEFAULT_LOG_DIR, DEFAULT_MODALITIES, DEFAULT_START_DATE, DEFAULT_STORE_PATH,
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_UF, DEFAULT_USER_AGENT, FEED_DATE_FORMAT,
    PNCP_PUBLICATIONS_URL,
};
use crate::error::{Result, ScraperError};
use crate::types::Modality;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "PNCP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub store: StoreConfig,
    pub log_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub uf: String,
    /// `YYYYMMDD`
    pub start_date: String,
    /// `YYYYMMDD`; today when unset
    pub end_date: Option<String>,
    pub timeout_seconds: u64,
    /// Pause between consecutive page requests
    pub delay_ms: u64,
    /// Upper bound on pages per modality; unlimited when unset
    pub max_pages: Option<u32>,
    pub user_agent: String,
    pub modalities: Vec<Modality>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
    /// Keep every row and mark duplicates instead of superseding them
    pub audit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            store: StoreConfig::default(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: PNCP_PUBLICATIONS_URL.to_string(),
            uf: DEFAULT_UF.to_string(),
            start_date: DEFAULT_START_DATE.to_string(),
            end_date: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            delay_ms: 0,
            max_pages: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            modalities: DEFAULT_MODALITIES
                .iter()
                .map(|(code, label)| Modality::new(code, label))
                .collect(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORE_PATH.to_string(),
            audit: false,
        }
    }
}

impl Config {
    /// Loads the configuration file.
    ///
    /// An explicit path (argument or `PNCP_CONFIG`) must exist; the implicit
    /// `config.toml` is optional and falls back to defaults.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
        let (config_path, required) = match explicit_path.map(str::to_string).or(env_path) {
            Some(path) => (path, true),
            None => (DEFAULT_CONFIG_PATH.to_string(), false),
        };

        if !required && !Path::new(&config_path).exists() {
            debug!("No {} found, using defaults", config_path);
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", config_path, e))
        })?;
        let config = Self::from_toml(&config_content)?;
        debug!("Loaded configuration from {}", config_path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let uf = self.feed.uf.trim();
        if uf.len() != 2 || !uf.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ScraperError::Config(format!(
                "feed.uf must be a two-letter state code, got '{}'",
                self.feed.uf
            )));
        }
        let start = parse_feed_date(&self.feed.start_date)?;
        let end = parse_feed_date(&self.feed.resolved_end_date())?;
        if start > end {
            return Err(ScraperError::Config(format!(
                "feed.start_date {} is after the end date {}",
                self.feed.start_date,
                self.feed.resolved_end_date()
            )));
        }
        if self.feed.timeout_seconds == 0 {
            return Err(ScraperError::Config("feed.timeout_seconds must be at least 1".into()));
        }
        if self.feed.max_pages == Some(0) {
            return Err(ScraperError::Config("feed.max_pages must be at least 1".into()));
        }
        if self.feed.modalities.is_empty() {
            return Err(ScraperError::Config("at least one modality is required".into()));
        }
        if self.store.path.trim().is_empty() {
            return Err(ScraperError::Config("store.path must not be empty".into()));
        }
        Ok(())
    }
}

impl FeedConfig {
    /// End of the query window, defaulting to today.
    pub fn resolved_end_date(&self) -> String {
        self.end_date
            .clone()
            .unwrap_or_else(|| Local::now().format(FEED_DATE_FORMAT).to_string())
    }
}

pub fn parse_feed_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, FEED_DATE_FORMAT).map_err(|e| {
        ScraperError::Config(format!("invalid date '{}' (expected YYYYMMDD): {}", value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_three_modalities() {
        let config = Config::default();
        let labels: Vec<&str> = config.feed.modalities.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Pregão", "Concorrência", "Dispensa"]);
        assert_eq!(config.feed.uf, "RN");
        assert!(!config.store.audit);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml(
            r#"
            [feed]
            uf = "PB"
            end_date = "20260131"

            [store]
            audit = true
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.uf, "PB");
        assert_eq!(config.feed.resolved_end_date(), "20260131");
        assert_eq!(config.feed.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert!(config.store.audit);
        assert_eq!(config.store.path, DEFAULT_STORE_PATH);
    }

    #[test]
    fn custom_modalities_replace_the_defaults() {
        let config = Config::from_toml(
            r#"
            [[feed.modalities]]
            code = "6"
            label = "Pregão"
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.modalities, vec![Modality::new("6", "Pregão")]);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let err = Config::from_toml("[feed]\nstart_date = \"2026-01-01\"\n").unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml("[feed]\ntimeout_seconds = 0\n").unwrap_err();
        assert!(matches!(err, ScraperError::Config(ref m) if m.contains("timeout_seconds")));
    }

    #[test]
    fn uf_must_be_two_letters() {
        assert!(Config::from_toml("[feed]\nuf = \"not a uf\"\n").is_err());
        assert!(Config::from_toml("[feed]\nuf = \"R1\"\n").is_err());
        assert!(Config::from_toml("[feed]\nuf = \"pb\"\nend_date = \"20260131\"\n").is_ok());
    }

    #[test]
    fn start_after_end_is_rejected() {
        let err = Config::from_toml(
            "[feed]\nstart_date = \"20270101\"\nend_date = \"20260101\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ScraperError::Config(ref m) if m.contains("after the end date")));
    }
}
