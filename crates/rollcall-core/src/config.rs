//! Application configuration management.
//!
//! Holds the event store connection, the attendance policy applied by the
//! engine, and the last teacher a report was generated for.
//!
//! Configuration is stored at `~/.config/rollcall/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::report::ReportError;
use crate::store::client::DEFAULT_TIMEOUT_SECS;

/// Application name used for config directory paths
const APP_NAME: &str = "rollcall";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_STORE_URL: &str = "ROLLCALL_STORE_URL";
pub const ENV_API_TOKEN: &str = "ROLLCALL_API_TOKEN";
pub const ENV_SNAPSHOT: &str = "ROLLCALL_SNAPSHOT";

const DEFAULT_PRESENT_MINUTES_THRESHOLD: u32 = 15;
const DEFAULT_SCHOOL_NAME: &str = "Regional Science High School";
const DEFAULT_FIXED_CLASS_DAYS: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub policy: Policy,
    pub last_teacher_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    /// Read students from a JSON snapshot instead of the HTTP store
    pub snapshot_path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            snapshot_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// School policy handed to the engine for every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Minutes inside the class window needed to count as present
    pub present_minutes_threshold: u32,
    pub school_name: String,
    /// Printed as "No. of class days" on the form
    pub fixed_class_days: u32,
    /// School clock offset from UTC; the machine's local zone when unset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            present_minutes_threshold: DEFAULT_PRESENT_MINUTES_THRESHOLD,
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            fixed_class_days: DEFAULT_FIXED_CLASS_DAYS,
            utc_offset_minutes: None,
        }
    }
}

impl Policy {
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.present_minutes_threshold == 0 {
            return Err(ReportError::InvalidPolicy(
                "present_minutes_threshold must be at least 1".to_string(),
            ));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if self.utc_offset().is_none() {
                return Err(ReportError::InvalidPolicy(format!(
                    "utc_offset_minutes out of range: {}",
                    minutes
                )));
            }
        }
        Ok(())
    }

    /// Fixed school clock, if configured and in range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        let minutes = self.utc_offset_minutes?;
        FixedOffset::east_opt(minutes.checked_mul(60)?)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Overlay store settings from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = value(ENV_STORE_URL) {
            self.store.base_url = Some(url);
        }
        if let Some(token) = value(ENV_API_TOKEN) {
            self.store.api_token = Some(token);
        }
        if let Some(path) = value(ENV_SNAPSHOT) {
            self.store.snapshot_path = Some(PathBuf::from(path));
        }
    }
}
