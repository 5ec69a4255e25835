//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// Recorded scenario to play back
    pub scenario: Option<PathBuf>,
    /// Simulated frame time in seconds
    #[serde(default = "default_frame_delta")]
    pub frame_delta_secs: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            frame_delta_secs: default_frame_delta(),
        }
    }
}

fn default_frame_delta() -> f64 {
    1.0 / 60.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Where published records go (default: stdout)
    pub file: Option<PathBuf>,
    /// Print the replay report at the end
    #[serde(default = "default_true")]
    pub include_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            file: None,
            include_report: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human readable line per record
    #[default]
    Txt,
    /// One JSON object per record
    Json,
}

impl AppConfig {
    /// Check values a TOML file can get wrong
    pub fn validate(&self) -> Result<()> {
        let delta = self.replay.frame_delta_secs;
        if !delta.is_finite() || delta <= 0.0 {
            anyhow::bail!("frame_delta_secs must be a positive number, got {}", delta);
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}
