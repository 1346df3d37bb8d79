use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_TIMEOUT_SECS};

/// User configuration read from `~/.tryit/config.json`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub timeout_secs: u64,
    /// Headers added to every request before Content-Type and auth
    pub additional_headers: IndexMap<String, String>,
    /// Tokens keyed by security scheme id
    pub credentials: HashMap<String, String>,
    pub server_index: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            additional_headers: IndexMap::new(),
            credentials: HashMap::new(),
            server_index: 0,
        }
    }
}

impl ConsoleConfig {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token_for(&self, scheme_id: &str) -> Option<&str> {
        self.credentials.get(scheme_id).map(String::as_str)
    }
}

/// `~/.tryit`, or `./.tryit` when no home directory is known
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}
