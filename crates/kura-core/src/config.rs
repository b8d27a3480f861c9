//! Application configuration management.
//!
//! Holds where durable slots and cache snapshots live, the offline worker's
//! generation settings, the assistant model and the admin access code.
//!
//! Configuration is stored at `~/.config/kura/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assistant::DEFAULT_MODEL;
use crate::offline::WorkerSettings;

/// Application name used for config/data directory paths
const APP_NAME: &str = "kura";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Sub-directory of the data directory holding cache snapshots
const OFFLINE_DIR: &str = "offline";

/// Access code of the admin console
const DEFAULT_ADMIN_CODE: &str = "ARM2024";

/// Environment variables checked, in order, for the assistant API key
const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Overrides the platform data directory for durable slots.
    pub data_dir: Option<PathBuf>,
    /// When set, logs are also written to daily files here.
    pub log_dir: Option<PathBuf>,
    pub offline: WorkerSettings,
    pub assistant_model: String,
    pub admin_code: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_dir: None,
            offline: WorkerSettings::default(),
            assistant_model: DEFAULT_MODEL.to_string(),
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn offline_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(OFFLINE_DIR))
    }

    /// API key for the assistant, read from the environment.
    pub fn api_key(&self) -> Option<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
    }

    pub fn check_admin_code(&self, code: &str) -> bool {
        !self.admin_code.is_empty() && code == self.admin_code
    }
}
