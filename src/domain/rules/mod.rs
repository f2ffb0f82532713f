// Domain rules - Business logic and policies

use chrono::{DateTime, Local};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Default length of a subclip when the user gives no end time
pub const DEFAULT_SUBCLIP_SECONDS: f64 = 5.0;

/// Frame rate assumed when the backend reports none
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

/// Rules for choosing and validating a trim range
pub struct TrimRules;

impl TrimRules {
    /// Resolve user-entered times against the source duration.
    ///
    /// Missing values fall back to `0` and `min(5, duration)`. Both values
    /// must lie in `[0, duration]` and start must precede end; nothing is
    /// corrected silently.
    pub fn resolve_range(
        start: Option<f64>,
        end: Option<f64>,
        duration: f64,
    ) -> Result<TimeRange, DomainError> {
        let start = start.unwrap_or(0.0);
        let end = end.unwrap_or_else(|| DEFAULT_SUBCLIP_SECONDS.min(duration));

        for (label, value) in [("Start", start), ("End", end)] {
            if value < 0.0 || value > duration + TIME_EPSILON {
                return Err(DomainError::OutOfRange(format!(
                    "{} time {:.2}s must be between 0 and {:.2}s",
                    label, value, duration
                )));
            }
        }

        let range = TimeRange::new(start, end)?;
        range.validate_within(duration)?;
        Ok(range)
    }

    /// File name disambiguator for a subclip: whole seconds of start and end
    pub fn disambiguator(range: &TimeRange) -> String {
        format!("{}-{}", range.start.trunc() as u64, range.end.trunc() as u64)
    }
}

/// Rules for fitting an audio track to a video
pub struct AudioRules;

impl AudioRules {
    /// Length audio is capped to when attached to a video
    pub fn capped_length(audio_duration: f64, video_duration: f64) -> f64 {
        audio_duration.min(video_duration)
    }

    /// Leading window of the audio that fits the video
    pub fn capped_window(audio: &MediaInfo, video: &MediaInfo) -> Result<TimeRange, DomainError> {
        let length = Self::capped_length(audio.duration, video.duration);
        TimeRange::leading(length).map_err(|_| {
            DomainError::Validation(format!(
                "Cannot attach audio of {:.2}s to video of {:.2}s",
                audio.duration, video.duration
            ))
        })
    }
}

/// Rules for estimating encoder work
pub struct FrameBudget;

impl FrameBudget {
    /// Expected frame count: floor(frame rate x duration)
    pub fn total_frames(frame_rate: f64, duration: f64) -> u64 {
        if !frame_rate.is_finite() || !duration.is_finite() || frame_rate <= 0.0 || duration <= 0.0 {
            return 0;
        }
        (frame_rate * duration).floor() as u64
    }
}

/// Rules for naming output artifacts
pub struct OutputNaming;

impl OutputNaming {
    /// `<Tag>_<disambiguator>_<HHMMSS>.mp4`
    pub fn file_name(tag: OperationTag, disambiguator: &str, at: &DateTime<Local>) -> String {
        format!("{}_{}_{}.mp4", tag, disambiguator, at.format("%H%M%S"))
    }

    /// Alternative name used when the preferred one is taken
    pub fn numbered(file_name: &str, attempt: u32) -> String {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) => format!("{}-{}.{}", stem, attempt, ext),
            None => format!("{}-{}", file_name, attempt),
        }
    }
}

#[cfg(test)]
mod tests;
