// src/config.rs
//! Service configuration: TOML file with serde defaults, then env overrides.
//!
//! Lookup order for the file:
//! 1) $TABLETALK_CONFIG_PATH (must exist)
//! 2) config/tabletalk.toml (optional)
//!
//! Env overrides: FRONTEND_URL, KEYWORD_CLOUD_FLEET, KEYWORD_CLOUD_RESTAURANT,
//! TREND_DEFAULT_WEEKS, RECENT_FEEDBACK, METRICS_ENABLED.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::engine::{FLEET_CLOUD_SIZE, RESTAURANT_CLOUD_SIZE};
use crate::trend::DEFAULT_TREND_WEEKS;

pub const ENV_CONFIG_PATH: &str = "TABLETALK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/tabletalk.toml";

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}
fn default_fleet_cloud() -> usize {
    FLEET_CLOUD_SIZE
}
fn default_restaurant_cloud() -> usize {
    RESTAURANT_CLOUD_SIZE
}
fn default_trend_weeks() -> usize {
    DEFAULT_TREND_WEEKS
}
fn default_recent() -> usize {
    3
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL encoded into table QR codes.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_fleet_cloud")]
    pub keyword_cloud_fleet: usize,
    #[serde(default = "default_restaurant_cloud")]
    pub keyword_cloud_restaurant: usize,
    #[serde(default = "default_trend_weeks")]
    pub trend_default_weeks: usize,
    #[serde(default = "default_recent")]
    pub recent_feedback: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            keyword_cloud_fleet: default_fleet_cloud(),
            keyword_cloud_restaurant: default_restaurant_cloud(),
            trend_default_weeks: default_trend_weeks(),
            recent_feedback: default_recent(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
            analytics: AnalyticsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// File (env path, then default path, then built-in defaults) + env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
                }
                Self::load_from_file(&pb)?
            }
            Err(_) => {
                let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
                if pb.exists() {
                    Self::load_from_file(&pb)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Override fields from environment variables; unparsable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("FRONTEND_URL") {
            if !url.trim().is_empty() {
                self.frontend_url = url.trim().to_string();
            }
        }
        override_usize("KEYWORD_CLOUD_FLEET", &mut self.analytics.keyword_cloud_fleet);
        override_usize(
            "KEYWORD_CLOUD_RESTAURANT",
            &mut self.analytics.keyword_cloud_restaurant,
        );
        override_usize("TREND_DEFAULT_WEEKS", &mut self.analytics.trend_default_weeks);
        override_usize("RECENT_FEEDBACK", &mut self.analytics.recent_feedback);
        if let Ok(v) = std::env::var("METRICS_ENABLED") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.metrics.enabled = true,
                "0" | "false" | "no" | "off" => self.metrics.enabled = false,
                other => warn!(value = other, "ignoring METRICS_ENABLED"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frontend_url.trim().is_empty() {
            bail!("frontend_url must not be empty");
        }
        let a = &self.analytics;
        if a.keyword_cloud_fleet == 0 || a.keyword_cloud_restaurant == 0 {
            bail!("keyword cloud sizes must be greater than 0");
        }
        if a.trend_default_weeks == 0 {
            bail!("trend_default_weeks must be greater than 0");
        }
        Ok(())
    }
}

fn override_usize(var: &str, slot: &mut usize) {
    if let Ok(raw) = std::env::var(var) {
        match raw.trim().parse::<usize>() {
            Ok(v) => *slot = v,
            Err(_) => warn!(var, value = %raw, "ignoring non-numeric override"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            frontend_url = "https://tabletalk.example"
            [analytics]
            keyword_cloud_fleet = 20
            "#,
        )
        .unwrap();
        assert_eq!(cfg.frontend_url, "https://tabletalk.example");
        assert_eq!(cfg.analytics.keyword_cloud_fleet, 20);
        assert_eq!(cfg.analytics.keyword_cloud_restaurant, RESTAURANT_CLOUD_SIZE);
        assert_eq!(cfg.analytics.recent_feedback, 3);
        assert!(cfg.metrics.enabled);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.analytics.keyword_cloud_restaurant = 0;
        assert!(cfg.validate().is_err());
    }
}
