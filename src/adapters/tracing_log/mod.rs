// Tracing log adapter - Structured logging using tracing crate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{VeditError, VeditResult};

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = VeditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(VeditError::Config {
                message: format!("Unknown log format: {}. Valid formats: pretty, json", s),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Check a level directive such as `info` or `vedit=debug,warn`
pub fn parse_filter(level: &str) -> VeditResult<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| VeditError::Config {
        message: format!("Invalid log level '{}': {}", level, e),
    })
}

/// Tracing subscriber setup for the binary
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Install the global subscriber writing to stderr.
    ///
    /// `RUST_LOG` wins over the configured level. Installing twice is not an
    /// error, so tests and embedders may call this freely.
    pub fn init(level: &str, format: LogFormat) -> VeditResult<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => parse_filter(level)?,
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);

        let _ = match format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_filter_validation() {
        assert!(parse_filter("debug").is_ok());
        assert!(parse_filter("vedit=trace,warn").is_ok());
        assert!(matches!(
            parse_filter("vedit=loudest"),
            Err(VeditError::Config { .. })
        ));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        assert!(TracingLogAdapter::init("info", LogFormat::Pretty).is_ok());
        assert!(TracingLogAdapter::init("debug", LogFormat::Json).is_ok());
    }
}
