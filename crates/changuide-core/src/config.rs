use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub pager: PagerConfig,
    #[serde(default)]
    pub hover: HoverConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the channel guide; relative links resolve against it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Optional HTTP/SOCKS proxy
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Attempts per request before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First listing page loaded by the pager
    #[serde(default = "default_start_page")]
    pub start_page: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            proxy_url: None,
            max_retries: default_max_retries(),
            start_page: default_start_page(),
        }
    }
}

/// Easing curve applied to carousel rotations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump straight to the end position on the last step
    None,
    Linear,
    /// (1 - cos(tπ)) / 2
    #[default]
    Cosine,
    Cubic,
    Quintic,
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Width of one featured card, in terminal cells
    #[serde(default = "default_item_width")]
    pub item_width: u16,
    /// Number of cards visible at once
    #[serde(default = "default_visible_count")]
    pub visible_count: usize,
    /// Cards moved per manual or automatic rotation
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Delay between animation steps in milliseconds
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Fraction of the animation covered per step
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Idle time before the carousel rotates on its own (0 disables)
    #[serde(default = "default_rotate_interval")]
    pub rotate_interval_secs: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Number of featured channels requested at startup
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            item_width: default_item_width(),
            visible_count: default_visible_count(),
            page_size: default_page_size(),
            step_ms: default_step_ms(),
            time_step: default_time_step(),
            rotate_interval_secs: default_rotate_interval(),
            easing: EasingType::default(),
            featured_limit: default_featured_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Load the next page once fewer than this many item heights remain below the viewport
    #[serde(default = "default_prefetch_items")]
    pub prefetch_items: u32,
    /// Height of one list item in rows
    #[serde(default = "default_item_height")]
    pub item_height: u32,
    /// Height of the pagination control in rows
    #[serde(default = "default_paginator_height")]
    pub paginator_height: u32,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            prefetch_items: default_prefetch_items(),
            item_height: default_item_height(),
            paginator_height: default_paginator_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverConfig {
    /// Descriptions longer than this are cut at the next space
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    /// Maximum number of tags listed in a popover
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            description_limit: default_description_limit(),
            max_tags: default_max_tags(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Genres offered by the genre browser
    #[serde(default = "default_genres")]
    pub genres: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            genres: default_genres(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("changuide")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://www.miroguide.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_start_page() -> String {
    "/popular/".to_string()
}

fn default_item_width() -> u16 {
    30
}

fn default_visible_count() -> usize {
    3
}

fn default_page_size() -> usize {
    3
}

fn default_step_ms() -> u64 {
    50
}

fn default_time_step() -> f64 {
    0.1
}

fn default_rotate_interval() -> u64 {
    20
}

fn default_featured_limit() -> usize {
    12
}

fn default_prefetch_items() -> u32 {
    5
}

fn default_item_height() -> u32 {
    3
}

fn default_paginator_height() -> u32 {
    1
}

fn default_description_limit() -> usize {
    285
}

fn default_max_tags() -> usize {
    5
}

fn default_tick_rate() -> u64 {
    250
}

fn default_genres() -> Vec<String> {
    ["Arts & Culture", "Comedy", "Food & Drink", "Music", "News", "Science", "Sports", "Technology"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("changuide")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Path of the log file used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("changuide.log")
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.carousel.visible_count, 3);
        assert_eq!(config.carousel.page_size, 3);
        assert_eq!(config.carousel.step_ms, 50);
        assert_eq!(config.carousel.rotate_interval_secs, 20);
        assert_eq!(config.carousel.easing, EasingType::Cosine);
        assert_eq!(config.hover.description_limit, 285);
        assert_eq!(config.hover.max_tags, 5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [carousel]
            item_width = 24
            easing = "linear"

            [api]
            base_url = "http://localhost:8000"
            "#,
        )
        .unwrap();

        assert_eq!(config.carousel.item_width, 24);
        assert_eq!(config.carousel.easing, EasingType::Linear);
        assert_eq!(config.carousel.visible_count, 3);
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.pager.prefetch_items, 5);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[carousel\nitem_width = ").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(&PathBuf::from("/tmp/changuide"));
        assert_eq!(expanded, PathBuf::from("/tmp/changuide"));
    }
}
