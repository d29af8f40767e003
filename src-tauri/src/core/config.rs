use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "VIDEO_AMPLIFIER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "video_amplifier.json";

/// Runtime settings. Every field has a default, so a partial JSON file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Scratch work area, relative to the working directory unless absolute.
    pub scratch_dir: PathBuf,
    /// Audio codec used for the final container.
    pub audio_codec: String,
    /// Factor pre-filled in the form.
    pub default_factor: f64,
    /// Appended to the input file stem when suggesting an output path.
    pub output_suffix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            scratch_dir: PathBuf::from("temp_audio_processing"),
            audio_codec: "aac".to_string(),
            default_factor: 2.0,
            output_suffix: "_amplified".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `$VIDEO_AMPLIFIER_CONFIG`, else `video_amplifier.json`.
    /// A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
