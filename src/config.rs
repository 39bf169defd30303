//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cms::{DocumentFilter, NotionConfig};
use crate::content::{is_valid_date_format, RenderOptions, DEFAULT_DATE_FORMAT};
use crate::counter::CounterConfig;
use crate::reactions::TrackerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cms: CmsConfig,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub reactions: ReactionsConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CmsConfig {
    #[serde(default = "default_cms_url")]
    pub base_url: String,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub database_id: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default = "default_post_type")]
    pub post_type: String,

    #[serde(default = "default_cms_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_fetch_nested")]
    pub fetch_nested: bool,
}

fn default_cms_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_status() -> String {
    "Published".to_string()
}

fn default_post_type() -> String {
    "Personal".to_string()
}

fn default_cms_timeout() -> u64 {
    30
}

fn default_fetch_nested() -> bool {
    true
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_cms_url(),
            token: String::new(),
            database_id: String::new(),
            api_version: default_api_version(),
            status: default_status(),
            post_type: default_post_type(),
            request_timeout_secs: default_cms_timeout(),
            fetch_nested: default_fetch_nested(),
        }
    }
}

impl CmsConfig {
    pub fn notion_config(&self) -> NotionConfig {
        NotionConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            database_id: self.database_id.clone(),
            api_version: self.api_version.clone(),
            request_timeout_secs: self.request_timeout_secs,
            ..Default::default()
        }
    }

    pub fn filter(&self) -> DocumentFilter {
        DocumentFilter {
            status: self.status.clone(),
            post_type: self.post_type.clone(),
        }
    }
}

/// Reaction and page-view API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_url")]
    pub base_url: String,

    #[serde(default = "default_site_timeout")]
    pub request_timeout_secs: u64,
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_site_timeout() -> u64 {
    10
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_site_url(),
            request_timeout_secs: default_site_timeout(),
        }
    }
}

impl SiteConfig {
    pub fn counter_config(&self) -> CounterConfig {
        CounterConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_secs * 1000,
        }
    }
}

/// Reaction tracking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionsConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_store_path")]
    pub store_path: String,

    #[serde(default = "default_optimistic")]
    pub optimistic: bool,
}

fn default_refresh_interval() -> u64 {
    25
}

fn default_store_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("folio").join("reactions.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./folio_data/reactions.json".to_string())
}

fn default_optimistic() -> bool {
    true
}

impl Default for ReactionsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            store_path: default_store_path(),
            optimistic: default_optimistic(),
        }
    }
}

impl ReactionsConfig {
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs.max(1)),
            optimistic: self.optimistic,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    pub embed_user: Option<String>,
}

fn default_max_depth() -> usize {
    crate::content::render::DEFAULT_MAX_DEPTH
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            date_format: default_date_format(),
            embed_user: None,
        }
    }
}

impl RenderConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_depth: self.max_depth,
            embed_user: self.embed_user.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config = Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Reject values that would only fail later, at render time
    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if !is_valid_date_format(&self.render.date_format) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field: "render.date_format",
                error: format!("'{}' cannot format a date", self.render.date_format),
            });
        }
        Ok(())
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First existing config file among the default locations
    pub fn find_default_path() -> Option<PathBuf> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("folio").join("config.toml")),
            Some(PathBuf::from("./folio.toml")),
        ];

        config_paths.into_iter().flatten().find(|path| path.exists())
    }

    /// Load from default locations or environment
    ///
    /// A config file that exists but cannot be loaded is an error rather
    /// than a silent fallback to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::find_default_path() {
            Some(path) => {
                let config = Self::load_with_env(&path)?;
                tracing::debug!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::debug!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // CMS overrides; the bare names are what deployments already export
        if let Some(token) = var("FOLIO_CMS_TOKEN").or_else(|| var("NOTION_SECRET")) {
            self.cms.token = token;
        }
        if let Some(id) = var("FOLIO_DATABASE_ID").or_else(|| var("BLOG_DATABASE_ID")) {
            self.cms.database_id = id;
        }

        // Site overrides
        if let Some(url) = var("FOLIO_SITE_URL") {
            self.site.base_url = url;
        }

        // Reaction overrides
        if let Some(path) = var("FOLIO_STORE_PATH") {
            self.reactions.store_path = path;
        }
        if let Some(secs) = var("FOLIO_REFRESH_SECS") {
            if let Ok(secs) = secs.parse() {
                self.reactions.refresh_interval_secs = secs;
            }
        }

        // Logging overrides
        if let Some(level) = var("FOLIO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FOLIO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid {field} in {path:?}: {error}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        error: String,
    },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Folio Configuration
#
# Environment variables override these settings:
# - FOLIO_CMS_TOKEN (or NOTION_SECRET)
# - FOLIO_DATABASE_ID (or BLOG_DATABASE_ID)
# - FOLIO_SITE_URL
# - FOLIO_STORE_PATH
# - FOLIO_REFRESH_SECS
# - FOLIO_LOG_LEVEL
# - FOLIO_LOG_FORMAT

[cms]
# Document API base URL
base_url = "https://api.notion.com"

# Integration secret and the database holding blog posts
token = ""
database_id = ""

# API version header
api_version = "2022-06-28"

# Only documents with this Status and Type are published
status = "Published"
post_type = "Personal"

# Request timeout in seconds
request_timeout_secs = 30

# Fetch the contents of collapsible sections
fetch_nested = true

[site]
# Origin serving /api/reactions and /api/views
base_url = "http://localhost:3000"

# Request timeout in seconds
request_timeout_secs = 10

[reactions]
# How often to refresh reaction counts (seconds)
refresh_interval_secs = 25

# Where this device's reaction flags are kept
# store_path = "~/.local/share/folio/reactions.json"

# Show reactions immediately, before the server confirms them
optimistic = true

[render]
# Maximum nesting of collapsible sections
max_depth = 8

# strftime format for article dates
date_format = "%A, %B %-d, %Y"

# CodePen user for embeds (derived from the embed URL when unset)
# embed_user = ""

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cms.status, "Published");
        assert_eq!(config.reactions.refresh_interval_secs, 25);
        assert!(config.reactions.optimistic);
        assert_eq!(config.render.max_depth, 8);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.site.base_url, "http://localhost:3000");
        assert_eq!(config.cms.api_version, "2022-06-28");
        assert!(config.cms.fetch_nested);
        assert_eq!(config.render.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[reactions]\nrefresh_interval_secs = 5\noptimistic = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        let tracker = config.reactions.tracker_config();
        assert_eq!(tracker.refresh_interval, Duration::from_secs(5));
        assert!(!tracker.optimistic);
        assert_eq!(config.cms.post_type, "Personal");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[cms\n").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_time_only_date_format_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[render]\ndate_format = \"%Y-%m-%d %H:%M\"\n").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "render.date_format"),
            other => panic!("expected invalid date format, got {:?}", other.map(|_| ())),
        }

        std::fs::write(&path, "[render]\ndate_format = \"%d/%m/%Y\"\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().render.date_format, "%d/%m/%Y");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NOTION_SECRET", "legacy-secret"),
            ("FOLIO_DATABASE_ID", "db-1"),
            ("BLOG_DATABASE_ID", "db-legacy"),
            ("FOLIO_REFRESH_SECS", "60"),
            ("FOLIO_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.cms.token, "legacy-secret");
        assert_eq!(config.cms.database_id, "db-1");
        assert_eq!(config.reactions.refresh_interval_secs, 60);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_section_conversions() {
        let config = Config::default();
        assert_eq!(config.site.counter_config().request_timeout_ms, 10_000);
        assert_eq!(config.cms.filter().post_type, "Personal");
        assert_eq!(config.cms.notion_config().page_size, 100);
        assert_eq!(config.render.render_options().max_depth, 8);
    }
}
