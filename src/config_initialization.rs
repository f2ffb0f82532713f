//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use crate::adapters::toml_config::AppConfig;
use crate::adapters::tracing_log::LogFormat;
use crate::cli::Cli;
use crate::domain::model::{AudioCodec, VideoCodec};
use crate::engine::progress::ProgressStyle;
use crate::error::{VeditError, VeditResult};

/// Files tried, in order, when no configuration file is named
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["vedit.toml", "config/vedit.toml"];

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub progress: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
}

impl From<&Cli> for ConfigOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format.clone(),
            video_codec: cli.video_codec.clone(),
            audio_codec: cli.audio_codec.clone(),
            progress: cli.progress.clone(),
            output_dir: cli.output_dir.clone(),
            state_dir: cli.state_dir.clone(),
        }
    }
}

/// Resolve configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> VeditResult<AppConfig> {
    resolve_configuration(
        &ConfigOverrides::from(cli),
        cli.config.as_deref(),
        Path::new("."),
        |key| std::env::var(key).ok(),
    )
}

/// Resolve configuration with an explicit working directory and environment lookup
pub fn resolve_configuration<F>(
    overrides: &ConfigOverrides,
    config_file: Option<&Path>,
    working_dir: &Path,
    env: F,
) -> VeditResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1: Defaults, replaced by the file when one is found
    let mut config = match locate_config_file(config_file, working_dir)? {
        Some(path) => AppConfig::load(&path)?,
        None => {
            debug!("No configuration file found, using defaults");
            AppConfig::default()
        }
    };

    // Step 2: Override with environment variables
    let env_overrides = apply_environment(&mut config, &env)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 3: Override with CLI arguments
    let cli_overrides = apply_cli_overrides(&mut config, overrides)?;
    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }

    Ok(config)
}

/// The named file, which must exist, or the first default file present
fn locate_config_file(explicit: Option<&Path>, working_dir: &Path) -> VeditResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(VeditError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| working_dir.join(name))
        .find(|path| path.is_file()))
}

fn parse_setting<T>(key: &str, value: &str) -> VeditResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| VeditError::Config {
        message: format!("{}: {}", key, e),
    })
}

fn apply_environment<F>(config: &mut AppConfig, env: &F) -> VeditResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let mut lookup = |key: &str| {
        let value = env(key).filter(|value| !value.trim().is_empty());
        if value.is_some() {
            debug!("Found environment override: {}", key);
            applied += 1;
        }
        value
    };

    if let Some(value) = lookup("VEDIT_LOG_LEVEL") {
        config.log_level = value;
    }
    if let Some(value) = lookup("VEDIT_LOG_FORMAT") {
        config.log_format = parse_setting::<LogFormat>("VEDIT_LOG_FORMAT", &value)?;
    }
    if let Some(value) = lookup("VEDIT_STATE_DIR") {
        config.state_dir = PathBuf::from(value);
    }
    if let Some(value) = lookup("VEDIT_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(value);
    }
    if let Some(value) = lookup("VEDIT_FFMPEG") {
        config.ffmpeg = PathBuf::from(value);
    }
    if let Some(value) = lookup("VEDIT_FFPROBE") {
        config.ffprobe = PathBuf::from(value);
    }
    if let Some(value) = lookup("VEDIT_THREADS") {
        config.threads = parse_setting::<usize>("VEDIT_THREADS", &value)?;
    }
    if let Some(value) = lookup("VEDIT_VIDEO_CODEC") {
        config.video_codec = parse_setting::<VideoCodec>("VEDIT_VIDEO_CODEC", &value)?;
    }
    if let Some(value) = lookup("VEDIT_AUDIO_CODEC") {
        config.audio_codec = parse_setting::<AudioCodec>("VEDIT_AUDIO_CODEC", &value)?;
    }
    if let Some(value) = lookup("VEDIT_PROGRESS") {
        config.progress = parse_setting::<ProgressStyle>("VEDIT_PROGRESS", &value)?;
    }

    Ok(applied)
}

fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) -> VeditResult<usize> {
    let mut applied = 0;

    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
        applied += 1;
    }
    if let Some(format) = &overrides.log_format {
        config.log_format = parse_setting::<LogFormat>("--log-format", format)?;
        applied += 1;
    }
    if let Some(codec) = &overrides.video_codec {
        config.video_codec = parse_setting::<VideoCodec>("--video-codec", codec)?;
        applied += 1;
    }
    if let Some(codec) = &overrides.audio_codec {
        config.audio_codec = parse_setting::<AudioCodec>("--audio-codec", codec)?;
        applied += 1;
    }
    if let Some(progress) = &overrides.progress {
        config.progress = parse_setting::<ProgressStyle>("--progress", progress)?;
        applied += 1;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output_dir = dir.clone();
        applied += 1;
    }
    if let Some(dir) = &overrides.state_dir {
        config.state_dir = dir.clone();
        applied += 1;
    }

    Ok(applied)
}
