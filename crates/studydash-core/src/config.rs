//! Application configuration management.
//!
//! Configuration holds the remote store URL, the last user to log in, and
//! the notes save delay. It is stored at `~/.config/studydash/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::features::notes::DEFAULT_DEBOUNCE;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "studydash";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides `remote_url` when set.
pub const REMOTE_URL_ENV: &str = "STUDYDASH_REMOTE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub remote_url: Option<String>,
    pub last_user: Option<String>,
    pub notes_debounce_ms: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
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

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn notes_debounce(&self) -> Duration {
        self.notes_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    /// Apply overrides from the environment.
    pub fn apply_env(&mut self) {
        self.apply_remote_url(std::env::var(REMOTE_URL_ENV).ok());
    }

    fn apply_remote_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.remote_url = Some(url.trim().to_string());
        }
    }
}
