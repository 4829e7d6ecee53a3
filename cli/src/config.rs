//! Host configuration file (`jibjib.toml`)

use jibjib_core::{LedgerConfig, TokenId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "jibjib.toml";
pub const DEFAULT_DATA_DIR: &str = "$HOME/.jibjib";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub storage: StorageConfig,
    /// Reward amounts seeded into a fresh ledger
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<String>,
    pub snapshot_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            snapshot_name: "ledger".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub id: TokenId,
    pub symbol: Option<String>,
    pub reward_amount: u64,
}

/// Load the config file; a missing file yields the defaults
pub fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if !path.exists() {
        log::warn!("config {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.ledger.validate()?;
    Ok(config)
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(path.replace("$HOME", &std::env::var("HOME").unwrap_or_default()))
}
