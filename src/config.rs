//! User configuration loaded through confy

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use kairo_core::SortStrategy;

/// Contents of `kairo.toml` in the platform config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the slice files and the TUI log
    pub data_directory: String,
    /// How completion and creation-date sorting combine
    pub sort_strategy: SortStrategy,
    /// Set to false to never print colors
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_directory = ProjectDirs::from("", "", "kairo")
            .map(|dirs| dirs.data_dir().to_string_lossy().into_owned())
            .unwrap_or_else(|| ".kairo".to_string());

        Self {
            data_directory,
            sort_strategy: SortStrategy::default(),
            color: true,
        }
    }
}

impl Config {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory)
    }
}
