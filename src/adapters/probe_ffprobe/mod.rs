//! FFprobe adapter for opening staged media
//!
//! Runs `ffprobe -print_format json -show_format -show_streams` and maps the
//! report onto [`MediaInfo`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    duration: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse an ffprobe rational such as `30000/1001`; `0/0` means unknown
pub fn parse_rational(text: &str) -> Option<f64> {
    let value = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_seconds(text: &Option<String>) -> Option<f64> {
    text.as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Map an ffprobe JSON report onto media facts
pub fn media_info_from_report(json: &[u8]) -> Result<MediaInfo, DomainError> {
    let report: ProbeReport = serde_json::from_slice(json)
        .map_err(|e| DomainError::Probe(format!("Failed to parse ffprobe output: {}", e)))?;

    let video = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let has_audio = report
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    // Container duration first, then the longest stream
    let duration = report
        .format
        .as_ref()
        .and_then(|format| parse_seconds(&format.duration))
        .or_else(|| {
            report
                .streams
                .iter()
                .filter_map(|s| parse_seconds(&s.duration))
                .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.max(d))))
        })
        .ok_or_else(|| DomainError::Probe("Media reports no duration".to_string()))?;

    let frame_rate = video.and_then(|stream| {
        stream
            .avg_frame_rate
            .as_deref()
            .and_then(parse_rational)
            .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rational))
    });

    Ok(MediaInfo {
        duration,
        frame_rate,
        has_video: video.is_some(),
        has_audio,
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
    })
}

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    binary: PathBuf,
}

impl FfprobeAdapter {
    /// Create an adapter running the given ffprobe binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn open(&self, path: &Path, kind: MediaKind) -> Result<MediaHandle, DomainError> {
        debug!("Probing {} with {}", path.display(), self.binary.display());

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::Probe(format!("Failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            return Err(DomainError::Probe(format!(
                "Cannot open {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let info = media_info_from_report(&output.stdout)?;
        if kind == MediaKind::Video && !info.has_video {
            return Err(DomainError::UnsupportedFormat(format!(
                "{} has no video stream",
                path.display()
            )));
        }
        if kind == MediaKind::Audio && !info.has_audio {
            return Err(DomainError::UnsupportedFormat(format!(
                "{} has no audio stream",
                path.display()
            )));
        }

        Ok(MediaHandle::open(path, kind, info))
    }
}
