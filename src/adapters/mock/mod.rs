// Mock adapters - In-process stand-ins for the media backend and host

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::session::SessionContext;
use crate::ports::*;

/// Bytes the mock probe understands: `duration=<s>;fps=<n>;audio=<bool>`
pub fn media_descriptor(duration: f64, fps: Option<f64>, has_audio: bool) -> Vec<u8> {
    match fps {
        Some(fps) => format!("duration={};fps={};audio={}", duration, fps, has_audio),
        None => format!("duration={};audio={}", duration, has_audio),
    }
    .into_bytes()
}

/// Probe adapter reading a media descriptor from the staged file itself
#[derive(Debug, Default)]
pub struct MockProbeAdapter;

impl MockProbeAdapter {
    pub fn new() -> Self {
        Self
    }

    fn parse(text: &str, kind: MediaKind) -> Result<MediaInfo, DomainError> {
        let mut info = match kind {
            MediaKind::Video => MediaInfo::video(0.0, 30.0, false),
            MediaKind::Audio => MediaInfo::audio(0.0),
        };

        for pair in text.trim().split(';').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| DomainError::Probe(format!("Malformed descriptor entry: {}", pair)))?;
            let invalid = || DomainError::Probe(format!("Invalid value for {}: {}", key, value));
            match key.trim() {
                "duration" => info.duration = value.trim().parse().map_err(|_| invalid())?,
                "fps" => info.frame_rate = Some(value.trim().parse().map_err(|_| invalid())?),
                "audio" => info.has_audio = value.trim().parse().map_err(|_| invalid())?,
                "video" => info.has_video = value.trim().parse().map_err(|_| invalid())?,
                other => {
                    return Err(DomainError::Probe(format!("Unknown descriptor key: {}", other)))
                }
            }
        }

        Ok(info)
    }
}

#[async_trait]
impl ProbePort for MockProbeAdapter {
    async fn open(&self, path: &Path, kind: MediaKind) -> Result<MediaHandle, DomainError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::Probe(format!("Cannot open {}: {}", path.display(), e)))?;
        let info = Self::parse(&String::from_utf8_lossy(&bytes), kind)?;
        Ok(MediaHandle::open(path, kind, info))
    }
}

/// One call recorded by [`MockExecuteAdapter`]
#[derive(Debug, Clone)]
pub struct EncodeCall {
    pub composition: Composition,
    pub settings: EncodeSettings,
    pub output: PathBuf,
}

/// Execute adapter that writes a small text file instead of encoding
#[derive(Debug, Default)]
pub struct MockExecuteAdapter {
    calls: Mutex<Vec<EncodeCall>>,
    failure: Option<String>,
}

impl MockExecuteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter whose every encode fails after writing a truncated file
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ExecutePort for MockExecuteAdapter {
    async fn encode(
        &self,
        composition: &Composition,
        settings: &EncodeSettings,
        output: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), DomainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(EncodeCall {
                composition: composition.clone(),
                settings: settings.clone(),
                output: output.to_path_buf(),
            });
        }

        let total = composition.total_frames();
        for step in 1..=4u64 {
            sink.on_progress("frame", total * step / 4, total);
            if step == 2 {
                if let Some(message) = &self.failure {
                    tokio::fs::write(output, b"truncated").await?;
                    return Err(DomainError::Backend(message.clone()));
                }
            }
        }

        let body = format!(
            "duration={};audio_duration={};inputs={}",
            composition.duration(),
            composition.audio_duration(),
            composition.inputs.len()
        );
        tokio::fs::write(output, body).await?;
        Ok(())
    }
}

/// Interaction host counting what the core asked of it
#[derive(Debug, Default)]
pub struct RecordingHost {
    invalidations: AtomicUsize,
    redraws: AtomicUsize,
    offered: Mutex<Vec<(OperationMode, OutputArtifact)>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::Relaxed)
    }

    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Relaxed)
    }

    pub fn offered(&self) -> Vec<(OperationMode, OutputArtifact)> {
        self.offered.lock().map(|offered| offered.clone()).unwrap_or_default()
    }
}

impl InteractionHost for RecordingHost {
    fn invalidate_caches(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    fn request_redraw(&self, _session: &SessionContext) {
        self.redraws.fetch_add(1, Ordering::Relaxed);
    }

    fn offer_artifact(&self, mode: OperationMode, artifact: &OutputArtifact) {
        if let Ok(mut offered) = self.offered.lock() {
            offered.push((mode, artifact.clone()));
        }
    }
}
