// Inspect interactor - Reports what the media backend sees in a file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::format_time;

/// Media facts of one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub info: MediaInfo,
}

impl InspectReport {
    /// Human-readable summary
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("File:     {}", self.path.display()),
            format!("Kind:     {}", self.kind),
            format!(
                "Duration: {} ({:.2}s)",
                format_time(self.info.duration),
                self.info.duration
            ),
        ];
        if let Some(fps) = self.info.frame_rate {
            lines.push(format!("FPS:      {:.3}", fps));
        }
        if let (Some(width), Some(height)) = (self.info.width, self.info.height) {
            lines.push(format!("Size:     {}x{}", width, height));
        }
        lines.push(format!(
            "Audio:    {}",
            if self.info.has_audio { "yes" } else { "no" }
        ));
        lines.join("\n")
    }
}

/// Media kind implied by a file name; anything not an accepted audio type is treated as video
pub fn kind_for_path(path: &Path) -> MediaKind {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if MediaKind::Audio.accepted_extensions().contains(&extension.as_str()) {
        MediaKind::Audio
    } else {
        MediaKind::Video
    }
}

/// Interactor for media file inspection
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Open a file through the backend and report its duration, frame rate and streams
    pub async fn execute(&self, path: &Path) -> Result<InspectReport, DomainError> {
        if !path.is_file() {
            return Err(DomainError::Io(format!(
                "Input file does not exist: {}",
                path.display()
            )));
        }

        let kind = kind_for_path(path);
        let mut handle = self.probe_port.open(path, kind).await?;
        info!("Inspected {}: {:.2}s", path.display(), handle.duration());

        let report = InspectReport {
            path: path.to_path_buf(),
            kind,
            info: handle.info.clone(),
        };
        handle.close()?;
        Ok(report)
    }
}
