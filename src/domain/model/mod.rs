// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Tolerance used when comparing user times against probed durations
pub const TIME_EPSILON: f64 = 1e-6;

/// Kind of media an upload carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// File extensions accepted for this kind, lowercase and without the dot
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => &["mp4", "mov", "avi"],
            MediaKind::Audio => &["mp3", "wav"],
        }
    }

    /// Staging suffix for an upload name, rejecting extensions this kind does not accept
    pub fn staging_suffix(&self, name: &str) -> Result<String, DomainError> {
        let extension = Path::new(name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension {
            Some(ext) if self.accepted_extensions().contains(&ext.as_str()) => {
                Ok(format!(".{}", ext))
            }
            _ => Err(DomainError::UnsupportedFormat(format!(
                "{} is not an accepted {} file (expected one of: {})",
                name,
                self,
                self.accepted_extensions().join(", ")
            ))),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Raw bytes handed over by the user for one slot of an operation
#[derive(Clone)]
pub struct Upload {
    pub name: String,
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create a new upload
    pub fn new(name: impl Into<String>, kind: MediaKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }

    /// Payload size in bytes
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Opaque token identifying one incarnation of an upload widget
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Generate a fresh token for the given role
    pub fn generate(role: &str) -> Self {
        Self(format!("{}_{}", role, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parse a session id; only ASCII letters, digits, '-' and '_' are allowed
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= 64
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(DomainError::Validation(format!(
                "Invalid session id '{}': use 1-64 letters, digits, '-' or '_'",
                raw
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Temporary on-disk copy of an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedFile {
    pub path: PathBuf,
    pub source_name: String,
    pub byte_len: u64,
    pub upload_key: IdentityToken,
}

impl StagedFile {
    /// Whether an incoming upload is the one already staged under the current widget identity
    pub fn matches(&self, upload: &Upload, current_key: &IdentityToken) -> bool {
        self.source_name == upload.name
            && self.byte_len == upload.byte_len()
            && &self.upload_key == current_key
    }
}

/// Stream-level facts the backend reports for an opened file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Frames per second of the primary video stream
    pub frame_rate: Option<f64>,
    pub has_video: bool,
    pub has_audio: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MediaInfo {
    /// Audio-only media of the given length
    pub fn audio(duration: f64) -> Self {
        Self {
            duration,
            frame_rate: None,
            has_video: false,
            has_audio: true,
            width: None,
            height: None,
        }
    }

    /// Video media of the given length and frame rate
    pub fn video(duration: f64, frame_rate: f64, has_audio: bool) -> Self {
        Self {
            duration,
            frame_rate: Some(frame_rate),
            has_video: true,
            has_audio,
            width: None,
            height: None,
        }
    }
}

/// Open/closed state of a media handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleState {
    Open,
    Closed,
}

/// Open reference to a staged file through the media backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaHandle {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub info: MediaInfo,
    pub state: HandleState,
}

impl MediaHandle {
    /// Wrap probed information into an open handle
    pub fn open(path: impl Into<PathBuf>, kind: MediaKind, info: MediaInfo) -> Self {
        Self {
            path: path.into(),
            kind,
            info,
            state: HandleState::Open,
        }
    }

    pub fn duration(&self) -> f64 {
        self.info.duration
    }

    pub fn is_open(&self) -> bool {
        self.state == HandleState::Open
    }

    /// Close the handle; closing twice is reported, never silently accepted
    pub fn close(&mut self) -> Result<(), DomainError> {
        match self.state {
            HandleState::Open => {
                self.state = HandleState::Closed;
                Ok(())
            }
            HandleState::Closed => Err(DomainError::AlreadyClosed(
                self.path.display().to_string(),
            )),
        }
    }
}

/// A staged file together with the handle opened on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedMedia {
    pub file: StagedFile,
    pub handle: MediaHandle,
}

/// Half-open time interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Create a range; start must be non-negative and strictly before end
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::Validation(
                "Time values must be finite numbers".to_string(),
            ));
        }
        if start < 0.0 {
            return Err(DomainError::Validation(
                "Start time cannot be negative".to_string(),
            ));
        }
        if start >= end {
            return Err(DomainError::Validation(
                "End time must be greater than start time".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Range starting at zero, used for capping audio
    pub fn leading(length: f64) -> Result<Self, DomainError> {
        Self::new(0.0, length)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Check that the range lies within [0, duration]
    pub fn validate_within(&self, duration: f64) -> Result<(), DomainError> {
        if self.end > duration + TIME_EPSILON {
            return Err(DomainError::OutOfRange(format!(
                "End time {:.2}s exceeds media duration {:.2}s",
                self.end, duration
            )));
        }
        Ok(())
    }
}

/// Gain applied to an audio track, within [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    /// Full volume, the default for a video's own audio
    pub const FULL: Volume = Volume(1.0);
    /// Half volume, the default for background music
    pub const HALF: Volume = Volume(0.5);
    /// Silence
    pub const MUTE: Volume = Volume(0.0);

    /// Create a volume, rejecting values outside [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DomainError::OutOfRange(format!(
                "Volume {} must be between 0.0 and 1.0",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for Volume {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::Validation(format!("Invalid volume: {}", s)))?;
        Self::new(value)
    }
}

/// Video codecs offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Libx264,
    Mpeg4,
    Libvpx,
}

impl VideoCodec {
    /// Encoder name passed to the backend
    pub fn encoder_name(&self) -> &'static str {
        match self {
            VideoCodec::Libx264 => "libx264",
            VideoCodec::Mpeg4 => "mpeg4",
            VideoCodec::Libvpx => "libvpx",
        }
    }
}

impl FromStr for VideoCodec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "libx264" => Ok(VideoCodec::Libx264),
            "mpeg4" => Ok(VideoCodec::Mpeg4),
            "libvpx" => Ok(VideoCodec::Libvpx),
            _ => Err(DomainError::Validation(format!(
                "Unknown video codec: {}. Valid codecs: libx264, mpeg4, libvpx",
                s
            ))),
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoder_name())
    }
}

/// Audio codecs offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Aac,
    Libvorbis,
    Mp3,
}

impl AudioCodec {
    /// Encoder name passed to the backend
    pub fn encoder_name(&self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Libvorbis => "libvorbis",
            // ffmpeg exposes the mp3 encoder as libmp3lame
            AudioCodec::Mp3 => "libmp3lame",
        }
    }
}

impl FromStr for AudioCodec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aac" => Ok(AudioCodec::Aac),
            "libvorbis" => Ok(AudioCodec::Libvorbis),
            "mp3" | "libmp3lame" => Ok(AudioCodec::Mp3),
            _ => Err(DomainError::Validation(format!(
                "Unknown audio codec: {}. Valid codecs: aac, libvorbis, mp3",
                s
            ))),
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCodec::Aac => write!(f, "aac"),
            AudioCodec::Libvorbis => write!(f, "libvorbis"),
            AudioCodec::Mp3 => write!(f, "mp3"),
        }
    }
}

/// Encoder settings chosen for one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    /// Encoder thread count; 0 lets the backend decide
    pub threads: usize,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: VideoCodec::default(),
            audio_codec: AudioCodec::default(),
            threads: 0,
        }
    }
}

/// The four editing operations, each with its own session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    Merge,
    Trim,
    Concat,
    Music,
}

impl OperationMode {
    pub fn all() -> [OperationMode; 4] {
        [
            OperationMode::Merge,
            OperationMode::Trim,
            OperationMode::Concat,
            OperationMode::Music,
        ]
    }

    /// Tag used in output file names
    pub fn tag(&self) -> OperationTag {
        match self {
            OperationMode::Merge | OperationMode::Music => OperationTag::Merged,
            OperationMode::Trim => OperationTag::Subclip,
            OperationMode::Concat => OperationTag::Concat,
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            OperationMode::Merge => "Merge Audio with Video",
            OperationMode::Trim => "Trim & Create Subclips",
            OperationMode::Concat => "Concatenate Videos",
            OperationMode::Music => "Add Background Music",
        }
    }
}

impl FromStr for OperationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(OperationMode::Merge),
            "trim" | "subclip" => Ok(OperationMode::Trim),
            "concat" | "concatenate" => Ok(OperationMode::Concat),
            "music" | "background" => Ok(OperationMode::Music),
            _ => Err(DomainError::Validation(format!(
                "Unknown operation: {}. Valid operations: merge, trim, concat, music",
                s
            ))),
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::Merge => write!(f, "merge"),
            OperationMode::Trim => write!(f, "trim"),
            OperationMode::Concat => write!(f, "concat"),
            OperationMode::Music => write!(f, "music"),
        }
    }
}

/// Prefix of an output artifact's file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationTag {
    Merged,
    Subclip,
    Concat,
}

impl OperationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationTag::Merged => "Merged",
            OperationTag::Subclip => "Subclip",
            OperationTag::Concat => "Concat",
        }
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Encoded result of a successful operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub tag: OperationTag,
    pub created_at: DateTime<Local>,
    pub byte_len: u64,
    /// Duration of the encoded timeline in seconds
    pub duration: f64,
}

impl OutputArtifact {
    /// File name shown to the user for download
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
