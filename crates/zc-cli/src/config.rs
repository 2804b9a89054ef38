//! CLI configuration: where the chain and the keypair live.
//!
//! Values come from command-line flags first, then an optional TOML file,
//! then defaults under `$HOME/.zc`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under `$HOME` holding default state.
pub const STATE_DIR: &str = ".zc";

/// Settings read from a config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub chain_path: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl FileConfig {
    /// Parse a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Resolved settings handed to every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub chain_path: PathBuf,
    pub key_file: PathBuf,
}

impl Config {
    /// Merge flag overrides, an optional config file and defaults.
    pub fn resolve(
        config_file: Option<&Path>,
        chain_path: Option<PathBuf>,
        key_file: Option<PathBuf>,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let state_dir = default_state_dir();
        Ok(Self {
            chain_path: chain_path
                .or(file.chain_path)
                .unwrap_or_else(|| state_dir.join("chain.json")),
            key_file: key_file
                .or(file.key_file)
                .unwrap_or_else(|| state_dir.join("keypair.json")),
        })
    }
}

/// `$HOME/.zc`, or `./.zc` when no home directory is known.
pub fn default_state_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR)
}
