//! TOML configuration file.
//!
//! Every table and key is optional. Resolution order for the file itself:
//! `--config`, then `MOODWATCH_CONFIG`, then built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use mood_core::{FRAME_HEIGHT, FRAME_WIDTH, Tuning};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "MOODWATCH_CONFIG";
pub const DEFAULT_CLASSIFIER_URL: &str = "http://127.0.0.1:5005";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tuning: Tuning,
    pub capture: CaptureConfig,
    pub classifier: ClassifierConfig,
    pub popup: PopupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Directory of frame images, replayed in name order.
    pub frames: Option<PathBuf>,
    /// Pacing in frames per second; 0 disables pacing.
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frames: None,
            fps: 30.0,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            looping: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Base URL of the facial-analysis service.
    pub url: Option<String>,
    /// JSON-lines file of canned analysis responses; wins over `url`.
    pub script: Option<PathBuf>,
    pub detector_backend: String,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: None,
            script: None,
            detector_backend: "opencv".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PopupBackend {
    /// Native desktop notification
    #[default]
    Desktop,
    /// Print popups to stdout
    Log,
    /// Discard popups
    None,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopupConfig {
    pub backend: PopupBackend,
}

impl Config {
    /// Load from `explicit`, else from `$MOODWATCH_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                tracing::debug!("loaded config from {}", path.display());
                Self::parse(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.tuning.validate()?;
        Ok(config)
    }
}
