//! Run configuration: resolved parameters plus the optional TOML file.

use clap::ValueEnum;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Everything a pipeline driver needs for one run.
/// Decouples the logic from how the arguments were parsed (CLI/config file).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub out_dir: PathBuf,
    pub format: ExportFormat,
    pub storage_root: Option<PathBuf>,
    pub sessions_dir: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
}

/// Preferences persisted in `~/.config/copilot-chat-export/config.toml`.
#[derive(Deserialize, Default)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub storage_root: Option<PathBuf>,
    pub format: Option<ExportFormat>,
}

/// Load the config file (explicit path > default location > empty defaults).
pub fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        // Search: XDG/OS config dir, then nothing
        dirs::config_dir()
            .map(|d| d.join("copilot-chat-export/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}
