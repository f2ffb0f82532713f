// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::tracing_log::LogFormat;
use crate::domain::model::*;
use crate::engine::progress::ProgressStyle;
use crate::error::{VeditError, VeditResult};

/// Settings read from the `[vedit]` table of a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Root of session files and staged uploads
    pub state_dir: PathBuf,
    /// Where output artifacts are written
    pub output_dir: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Encoder threads; 0 uses every CPU
    pub threads: usize,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub progress: ProgressStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            state_dir: std::env::temp_dir().join("vedit"),
            output_dir: PathBuf::from("."),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            threads: 0,
            video_codec: VideoCodec::default(),
            audio_codec: AudioCodec::default(),
            progress: ProgressStyle::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(default)]
    vedit: AppConfig,
}

impl AppConfig {
    /// Parse TOML text; keys missing from the `[vedit]` table keep their defaults
    pub fn from_toml_str(content: &str) -> VeditResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.vedit)
    }

    /// Load a TOML configuration file
    pub fn load(path: &Path) -> VeditResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VeditError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Render as a TOML document with a `[vedit]` table
    pub fn to_toml_string(&self) -> VeditResult<String> {
        let file = ConfigFile {
            vedit: self.clone(),
        };
        toml::to_string_pretty(&file).map_err(|e| VeditError::Config {
            message: format!("Failed to serialize configuration: {}", e),
        })
    }

    /// Encoder thread count with 0 resolved to the CPU count
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Encoder settings for an operation
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            video_codec: self.video_codec,
            audio_codec: self.audio_codec,
            threads: self.effective_threads(),
        }
    }
}
