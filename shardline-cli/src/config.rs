//! Configuration management
//!
//! Config directory: ~/.shardline/ (cross-platform)
//!
//! Config file format (~/.shardline/config.toml):
//! ```toml
//! [storage]
//! disks = ["/mnt/disk0", "/mnt/disk1", "/mnt/disk2"]
//! volume = "default"
//!
//! [erasure]
//! data_shards = 2
//! parity_shards = 1
//! block_size = 10485760
//!
//! [hash]
//! algorithm = "blake2b"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shardline_core::erasure_config_from_env;
use std::fs;
use std::path::{Path, PathBuf};

/// Structure of ~/.shardline/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShardlineConfig {
    /// Disk layout
    #[serde(default)]
    pub storage: StorageSettings,

    /// Erasure layout
    #[serde(default)]
    pub erasure: ErasureSettings,

    /// Integrity hashing
    #[serde(default)]
    pub hash: HashSettings,
}

/// Disk settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// One directory per disk, in shard order
    #[serde(default = "default_disks")]
    pub disks: Vec<PathBuf>,

    /// Volume that objects are written under
    #[serde(default = "default_volume")]
    pub volume: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            disks: default_disks(),
            volume: default_volume(),
        }
    }
}

fn default_disks() -> Vec<PathBuf> {
    std::env::var("SHARDLINE_DISKS")
        .map(|v| parse_disk_list(&v))
        .unwrap_or_default()
}

fn default_volume() -> String {
    std::env::var("SHARDLINE_VOLUME").unwrap_or_else(|_| "default".to_string())
}

/// Erasure settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErasureSettings {
    #[serde(default = "default_data_shards")]
    pub data_shards: usize,

    #[serde(default = "default_parity_shards")]
    pub parity_shards: usize,

    /// Logical bytes per encoded block
    #[serde(default = "default_block_size")]
    pub block_size: u64,
}

impl Default for ErasureSettings {
    fn default() -> Self {
        let (data_shards, parity_shards, block_size) = erasure_config_from_env();
        Self {
            data_shards,
            parity_shards,
            block_size,
        }
    }
}

fn default_data_shards() -> usize {
    erasure_config_from_env().0
}

fn default_parity_shards() -> usize {
    erasure_config_from_env().1
}

fn default_block_size() -> u64 {
    erasure_config_from_env().2
}

/// Hash settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashSettings {
    /// Algorithm name; unknown names fall back to blake2b
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
        }
    }
}

fn default_algorithm() -> String {
    std::env::var("SHARDLINE_HASH_ALGORITHM").unwrap_or_else(|_| "blake2b".to_string())
}

/// Split a comma-separated disk list
pub fn parse_disk_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Get the config directory path (~/.shardline/)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".shardline"))
}

/// Get the default config file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from `path`, falling back to defaults if it doesn't exist
pub fn load_config(path: &Path) -> Result<ShardlineConfig> {
    if !path.exists() {
        return Ok(ShardlineConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Save configuration to `path`, creating its directory
pub fn save_config(path: &Path, config: &ShardlineConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}
