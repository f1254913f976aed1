//! Configuration file parsing for .pindrop.toml

use crate::ad_gate::{AdFrequencyTable, AdTiming};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILENAME: &str = ".pindrop.toml";

/// Environment variable overriding `api.base_url`
pub const API_BASE_ENV: &str = "PINDROP_API_BASE";

/// Main configuration structure for .pindrop.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PindropConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ads: AdSettings,

    #[serde(default)]
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL (no trailing slash)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSettings {
    /// Total seconds the overlay stays up
    #[serde(default = "default_total_seconds")]
    pub total_seconds: u32,

    /// Seconds before the overlay can be skipped
    #[serde(default = "default_skip_after_seconds")]
    pub skip_after_seconds: u32,

    /// Show an ad on every Nth video download
    #[serde(default = "default_video_every")]
    pub video_every: u32,

    #[serde(default = "default_still_every")]
    pub image_every: u32,

    #[serde(default = "default_still_every")]
    pub gif_every: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Payment provider public key
    #[serde(default)]
    pub public_key: String,

    /// Hosted checkout page opened by `pindrop premium upgrade`
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,

    /// Provider plan code attached to monthly subscriptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_plan_code: Option<String>,
}

// Default functions
fn default_base_url() -> String {
    "https://api.pindrop.app".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_total_seconds() -> u32 {
    15
}

fn default_skip_after_seconds() -> u32 {
    5
}

fn default_video_every() -> u32 {
    2
}

fn default_still_every() -> u32 {
    3
}

fn default_checkout_url() -> String {
    "https://pindrop.app/checkout".to_string()
}

impl Default for PindropConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML should parse to defaults")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AdSettings {
    fn default() -> Self {
        Self {
            total_seconds: default_total_seconds(),
            skip_after_seconds: default_skip_after_seconds(),
            video_every: default_video_every(),
            image_every: default_still_every(),
            gif_every: default_still_every(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            checkout_url: default_checkout_url(),
            monthly_plan_code: None,
        }
    }
}

impl AdSettings {
    /// Rejects settings that would break the ad gate's invariants.
    pub fn validate(&self) -> Result<()> {
        if self.total_seconds == 0 {
            bail!("ads.total_seconds must be at least 1");
        }
        if self.skip_after_seconds > self.total_seconds {
            bail!(
                "ads.skip_after_seconds ({}) exceeds ads.total_seconds ({})",
                self.skip_after_seconds,
                self.total_seconds
            );
        }
        for (name, every) in [
            ("video_every", self.video_every),
            ("image_every", self.image_every),
            ("gif_every", self.gif_every),
        ] {
            if every == 0 {
                bail!("ads.{} must be at least 1", name);
            }
        }
        Ok(())
    }

    pub fn frequency_table(&self) -> Result<AdFrequencyTable> {
        self.validate()?;
        AdFrequencyTable::new(self.video_every, self.image_every, self.gif_every)
    }

    pub fn timing(&self) -> AdTiming {
        AdTiming {
            total_seconds: self.total_seconds,
            skip_after_seconds: self.skip_after_seconds,
        }
    }
}

impl PindropConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: PindropConfig = toml::from_str(&contents)?;
        config.ads.validate()?;
        Ok(config)
    }

    /// Find and load .pindrop.toml from the current directory or ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(Self::default())
    }

    /// Applies `PINDROP_API_BASE` on top of the file value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            let base = base.trim();
            if !base.is_empty() {
                self.api.base_url = base.to_string();
            }
        }
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        self
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
