//! Configuration module for Nestle

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gesture::Platform;
use crate::theme::Theme;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Platform profile (ios, android)
    #[serde(default)]
    pub platform: Platform,

    /// Selected theme
    #[serde(default)]
    pub theme: Theme,

    /// Bottom sheet timings and thresholds
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Tab pager timings and thresholds
    #[serde(default)]
    pub tabs: TabsConfig,

    /// Feed paging and dwell tracking
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Bottom sheet settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Open/close animation duration in milliseconds
    #[serde(default = "default_sheet_duration")]
    pub open_duration_ms: u64,

    /// Extra distance past the screen bottom for the closed position
    #[serde(default = "default_close_margin")]
    pub close_margin: f32,

    /// Fraction of screen height past open that dismisses on release
    #[serde(default = "default_dismiss_ratio")]
    pub dismiss_ratio: f32,

    /// Resistive-mode over-drag allowance (floor is `600 - screen_height`)
    #[serde(default = "default_over_drag")]
    pub over_drag_allowance: f32,

    /// Sheet height as a fraction of the screen (rendering only)
    #[serde(default = "default_height_ratio")]
    pub height_ratio: f32,

    /// Content swap delay in milliseconds; the platform default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_swap_delay_ms: Option<u64>,
}

/// Tab pager settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabsConfig {
    /// Settle tween duration in milliseconds
    #[serde(default = "default_settle_duration")]
    pub settle_duration_ms: u64,

    /// Fraction of a page that commits a swipe on release
    #[serde(default = "default_distance_ratio")]
    pub distance_ratio: f32,

    /// Release speed (px/s) that commits a swipe regardless of distance
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f32,
}

/// Feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Load more when this close to the end of the list
    #[serde(default = "default_end_reached")]
    pub end_reached_threshold: usize,

    /// Minimum focus time for a post to count as seen, in milliseconds
    #[serde(default = "default_min_dwell")]
    pub min_dwell_ms: u64,
}

fn default_sheet_duration() -> u64 {
    200
}

fn default_close_margin() -> f32 {
    100.0
}

fn default_dismiss_ratio() -> f32 {
    0.2
}

fn default_over_drag() -> f32 {
    600.0
}

fn default_height_ratio() -> f32 {
    0.6
}

fn default_settle_duration() -> u64 {
    200
}

fn default_distance_ratio() -> f32 {
    1.0 / 3.0
}

fn default_velocity_threshold() -> f32 {
    500.0
}

fn default_page_size() -> usize {
    20
}

fn default_end_reached() -> usize {
    5
}

fn default_min_dwell() -> u64 {
    1000
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            open_duration_ms: default_sheet_duration(),
            close_margin: default_close_margin(),
            dismiss_ratio: default_dismiss_ratio(),
            over_drag_allowance: default_over_drag(),
            height_ratio: default_height_ratio(),
            content_swap_delay_ms: None,
        }
    }
}

impl SheetConfig {
    /// Open/close animation duration
    pub const fn open_duration(&self) -> Duration {
        Duration::from_millis(self.open_duration_ms)
    }

    /// Content swap delay, falling back to the platform default
    pub fn content_swap_delay(&self, platform: Platform) -> Duration {
        self.content_swap_delay_ms
            .map_or_else(|| platform.content_swap_delay(), Duration::from_millis)
    }
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            settle_duration_ms: default_settle_duration(),
            distance_ratio: default_distance_ratio(),
            velocity_threshold: default_velocity_threshold(),
        }
    }
}

impl TabsConfig {
    /// Settle tween duration
    pub const fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            end_reached_threshold: default_end_reached(),
            min_dwell_ms: default_min_dwell(),
        }
    }
}

impl FeedConfig {
    /// Minimum dwell for a seen record
    pub const fn min_dwell(&self) -> Duration {
        Duration::from_millis(self.min_dwell_ms)
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("nestle");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}
