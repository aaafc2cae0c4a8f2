use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StoreError};

const APP_DIR: &str = "personal-ai";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the trained profile lives. Defaults to the platform data dir.
    pub store_path: Option<PathBuf>,
    pub validation_debounce_ms: u64,
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub submit_delay_ms: u64,
    pub welcome_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            store_path: None,
            validation_debounce_ms: 300,
            reply_delay_min_ms: 1500,
            reply_delay_max_ms: 2500,
            submit_delay_ms: 2000,
            welcome_delay_ms: 1000,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Half-open window the simulated reply latency is drawn from.
    ///
    /// An inverted window collapses to its lower bound.
    pub fn reply_delay_window(&self) -> Range<u64> {
        let min = self.reply_delay_min_ms;
        let max = self.reply_delay_max_ms.max(min.saturating_add(1));
        min..max
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn welcome_delay(&self) -> Duration {
        Duration::from_millis(self.welcome_delay_ms)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoDataDir)?;

        Ok(config_dir.join(APP_DIR).join("config.json"))
    }

    /// Directory for the profile record and the log file.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;

        Ok(data_dir.join(APP_DIR))
    }
}
