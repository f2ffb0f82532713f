// Upload staging - Moves uploads into session slots

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::lifecycle::LifecycleManager;
use crate::ports::*;

/// What a round did with its uploads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReceiveReport {
    /// Uploads written to new staged files
    pub staged: usize,
    /// Uploads recognized as already staged
    pub reused: usize,
    /// Previously staged files that were replaced or dropped
    pub retired: usize,
}

impl ReceiveReport {
    pub fn absorb(&mut self, other: ReceiveReport) {
        self.staged += other.staged;
        self.reused += other.reused;
        self.retired += other.retired;
    }
}

/// Handle of a filled slot, or a missing-upload error
pub fn open_handle<'a>(
    slot: &'a Option<StagedMedia>,
    missing: &str,
) -> Result<&'a MediaHandle, DomainError> {
    match slot {
        Some(media) if media.handle.is_open() => Ok(&media.handle),
        _ => Err(DomainError::MissingUpload(missing.to_string())),
    }
}

/// Whether a slot already holds this upload and its staged file is still on disk
fn is_current(media: &StagedMedia, upload: &Upload, key: &IdentityToken) -> bool {
    media.file.matches(upload, key) && media.file.path.is_file()
}

/// Stages uploads and opens them through the media backend
pub struct UploadStager {
    probe_port: Arc<dyn ProbePort>,
}

impl UploadStager {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Stage and open one upload. The staged file is released again if it cannot be opened.
    pub async fn stage(
        &self,
        lifecycle: &LifecycleManager,
        upload: &Upload,
        key: &IdentityToken,
    ) -> Result<StagedMedia, DomainError> {
        let file = lifecycle.store().stage_upload(upload, key)?;
        match self.probe_port.open(&file.path, upload.kind).await {
            Ok(handle) => {
                info!(
                    "Staged {} {} ({:.2}s) at {}",
                    upload.kind,
                    upload.name,
                    handle.duration(),
                    file.path.display()
                );
                Ok(StagedMedia { file, handle })
            }
            Err(e) => {
                lifecycle.store().release([&file.path]);
                Err(e)
            }
        }
    }

    /// Fill a single-file slot, reusing the staged file when the upload is unchanged
    pub async fn accept_single(
        &self,
        lifecycle: &LifecycleManager,
        slot: &mut Option<StagedMedia>,
        upload: &Upload,
        key: &IdentityToken,
    ) -> Result<ReceiveReport, DomainError> {
        let mut report = ReceiveReport::default();

        if let Some(existing) = slot.as_ref() {
            if is_current(existing, upload, key) {
                debug!("Reusing staged {} for {}", existing.file.path.display(), upload.name);
                report.reused = 1;
                return Ok(report);
            }
        }

        let media = self.stage(lifecycle, upload, key).await?;
        report.staged = 1;

        if let Some(mut previous) = slot.replace(media) {
            lifecycle.retire(&mut previous);
            report.retired = 1;
        }

        Ok(report)
    }

    /// Fill an ordered multi-file slot.
    ///
    /// Entry `i` is staged only when nothing matching is cached at index `i`,
    /// so re-sending the same list stages nothing new.
    pub async fn accept_sequence(
        &self,
        lifecycle: &LifecycleManager,
        slots: &mut Vec<StagedMedia>,
        uploads: &[Upload],
        key: &IdentityToken,
    ) -> Result<ReceiveReport, DomainError> {
        let mut report = ReceiveReport::default();

        for (index, upload) in uploads.iter().enumerate() {
            if index >= slots.len() {
                let media = self.stage(lifecycle, upload, key).await?;
                slots.push(media);
                report.staged += 1;
                continue;
            }

            if is_current(&slots[index], upload, key) {
                report.reused += 1;
                continue;
            }

            let media = self.stage(lifecycle, upload, key).await?;
            let mut previous = std::mem::replace(&mut slots[index], media);
            lifecycle.retire(&mut previous);
            report.staged += 1;
            report.retired += 1;
        }

        // A shorter list means the user removed trailing inputs
        if !uploads.is_empty() && slots.len() > uploads.len() {
            for mut dropped in slots.drain(uploads.len()..) {
                lifecycle.retire(&mut dropped);
                report.retired += 1;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fs_staging::TempFileStore;
    use crate::adapters::mock::{media_descriptor, MockProbeAdapter, RecordingHost};
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (UploadStager, LifecycleManager) {
        let store = TempFileStore::new(dir.path()).unwrap();
        let lifecycle = LifecycleManager::new(store, Arc::new(RecordingHost::new()));
        (UploadStager::new(Arc::new(MockProbeAdapter::new())), lifecycle)
    }

    fn video(name: &str, duration: f64) -> Upload {
        Upload::new(name, MediaKind::Video, media_descriptor(duration, Some(30.0), true))
    }

    fn staged_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_same_upload_is_reused() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let key = IdentityToken::generate("subclip_key");
        let mut slot = None;

        let first = stager.accept_single(&lifecycle, &mut slot, &video("a.mp4", 10.0), &key).await.unwrap();
        let second = stager.accept_single(&lifecycle, &mut slot, &video("a.mp4", 10.0), &key).await.unwrap();

        assert_eq!(first.staged, 1);
        assert_eq!(second.reused, 1);
        assert_eq!(staged_count(&dir), 1);
    }

    #[tokio::test]
    async fn test_different_upload_replaces_and_releases() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let key = IdentityToken::generate("subclip_key");
        let mut slot = None;

        stager.accept_single(&lifecycle, &mut slot, &video("a.mp4", 10.0), &key).await.unwrap();
        let old_path = slot.as_ref().unwrap().file.path.clone();
        let report = stager.accept_single(&lifecycle, &mut slot, &video("b.mp4", 7.0), &key).await.unwrap();

        assert_eq!(report.retired, 1);
        assert!(!old_path.exists());
        assert_eq!(slot.as_ref().unwrap().handle.duration(), 7.0);
        assert_eq!(staged_count(&dir), 1);
    }

    #[tokio::test]
    async fn test_new_widget_identity_restages() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let mut slot = None;

        let old_key = IdentityToken::generate("subclip_key");
        stager.accept_single(&lifecycle, &mut slot, &video("a.mp4", 10.0), &old_key).await.unwrap();
        let new_key = IdentityToken::generate("subclip_key");
        let report = stager.accept_single(&lifecycle, &mut slot, &video("a.mp4", 10.0), &new_key).await.unwrap();

        assert_eq!(report.staged, 1);
        assert_eq!(slot.unwrap().file.upload_key, new_key);
    }

    #[tokio::test]
    async fn test_unreadable_upload_leaves_slot_and_disk_alone() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let key = IdentityToken::generate("subclip_key");
        let mut slot = None;

        stager.accept_single(&lifecycle, &mut slot, &video("a.mp4", 10.0), &key).await.unwrap();
        let broken = Upload::new("b.mp4", MediaKind::Video, b"garbage".to_vec());
        let result = stager.accept_single(&lifecycle, &mut slot, &broken, &key).await;

        assert!(matches!(result, Err(DomainError::Probe(_))));
        assert_eq!(slot.unwrap().file.source_name, "a.mp4");
        assert_eq!(staged_count(&dir), 1);
    }

    #[tokio::test]
    async fn test_sequence_stages_only_new_indices() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let key = IdentityToken::generate("concat_key");
        let mut clips = Vec::new();

        let two = [video("a.mp4", 2.0), video("b.mp4", 3.0)];
        let three = [video("a.mp4", 2.0), video("b.mp4", 3.0), video("c.mp4", 4.0)];

        stager.accept_sequence(&lifecycle, &mut clips, &two, &key).await.unwrap();
        let idle = stager.accept_sequence(&lifecycle, &mut clips, &two, &key).await.unwrap();
        let grown = stager.accept_sequence(&lifecycle, &mut clips, &three, &key).await.unwrap();

        assert_eq!(idle, ReceiveReport { staged: 0, reused: 2, retired: 0 });
        assert_eq!(grown.staged, 1);
        assert_eq!(staged_count(&dir), 3);
        let names: Vec<&str> = clips.iter().map(|c| c.file.source_name.as_str()).collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[tokio::test]
    async fn test_sequence_restages_missing_files() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let key = IdentityToken::generate("concat_key");
        let mut clips = Vec::new();

        let two = [video("a.mp4", 2.0), video("b.mp4", 3.0)];
        stager.accept_sequence(&lifecycle, &mut clips, &two, &key).await.unwrap();
        std::fs::remove_file(&clips[1].file.path).unwrap();

        let report = stager.accept_sequence(&lifecycle, &mut clips, &two, &key).await.unwrap();

        assert_eq!(report, ReceiveReport { staged: 1, reused: 1, retired: 1 });
        assert!(clips.iter().all(|clip| clip.file.path.is_file()));
        assert_eq!(staged_count(&dir), 2);
    }

    #[tokio::test]
    async fn test_sequence_shrinks_with_shorter_list() {
        let dir = TempDir::new().unwrap();
        let (stager, lifecycle) = setup(&dir);
        let key = IdentityToken::generate("concat_key");
        let mut clips = Vec::new();

        let three = [video("a.mp4", 2.0), video("b.mp4", 3.0), video("c.mp4", 4.0)];
        stager.accept_sequence(&lifecycle, &mut clips, &three, &key).await.unwrap();
        let report = stager.accept_sequence(&lifecycle, &mut clips, &three[..1], &key).await.unwrap();

        assert_eq!(report.retired, 2);
        assert_eq!(clips.len(), 1);
        assert_eq!(staged_count(&dir), 1);
    }
}
