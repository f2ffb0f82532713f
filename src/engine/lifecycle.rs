//! Cleanup of a mode's handles, files and session entries
//!
//! [`LifecycleManager::cleanup`] is the one place where handles, staged
//! files, session entries, derived caches and the interface redraw are all
//! reconciled. It never fails: every per-resource problem is logged and
//! listed in the returned [`CleanupReport`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::fs_staging::{ReleaseReport, TempFileStore};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::session::{ModeState, SessionContext};
use crate::ports::InteractionHost;

/// Fresh session state to install once resources are released
#[derive(Debug, Clone, PartialEq)]
pub struct ResetSpec {
    pub fresh_state: ModeState,
}

impl ResetSpec {
    /// Reset a mode to empty slots with brand-new widget identities
    pub fn fresh(mode: OperationMode) -> Self {
        Self {
            fresh_state: ModeState::fresh(mode),
        }
    }
}

/// Summary of one cleanup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    pub handles_closed: usize,
    /// Handles that were closed before cleanup reached them
    pub already_closed: usize,
    pub close_failures: Vec<String>,
    pub files: ReleaseReport,
    /// Mode whose state was reset
    pub reset: Option<OperationMode>,
}

impl CleanupReport {
    /// Number of resources that could not be reclaimed
    pub fn failure_count(&self) -> usize {
        self.close_failures.len() + self.files.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "closed {} handle(s) ({} already closed), removed {} file(s) ({} already gone), {} failure(s)",
            self.handles_closed,
            self.already_closed,
            self.files.removed.len(),
            self.files.missing.len(),
            self.failure_count()
        )
    }
}

/// Lifecycle manager for one session's resources
pub struct LifecycleManager {
    store: TempFileStore,
    host: Arc<dyn InteractionHost>,
}

impl LifecycleManager {
    pub fn new(store: TempFileStore, host: Arc<dyn InteractionHost>) -> Self {
        Self { store, host }
    }

    /// Store holding the session's staged files
    pub fn store(&self) -> &TempFileStore {
        &self.store
    }

    /// Close handles, release files, apply the reset, then invalidate caches and redraw
    pub fn cleanup<'h, H>(
        &self,
        session: &mut SessionContext,
        handles: H,
        files: &[PathBuf],
        reset: ResetSpec,
    ) -> CleanupReport
    where
        H: IntoIterator<Item = &'h mut MediaHandle>,
    {
        let mut report = CleanupReport::default();

        for handle in handles {
            match handle.close() {
                Ok(()) => report.handles_closed += 1,
                Err(DomainError::AlreadyClosed(_)) => report.already_closed += 1,
                Err(e) => {
                    warn!("Failed to close handle for {}: {}", handle.path.display(), e);
                    report.close_failures.push(e.to_string());
                }
            }
        }

        report.files = self.store.release(files);

        let mode = reset.fresh_state.mode();
        session.install(reset.fresh_state);
        report.reset = Some(mode);

        self.host.invalidate_caches();
        self.host.request_redraw(session);

        info!("Cleared {} state of session {}: {}", mode, session.id, report);
        report
    }

    /// Clear everything one mode owns: handles, staged files and the output artifact
    pub fn clear_mode(&self, session: &mut SessionContext, mode: OperationMode) -> CleanupReport {
        let mut retired = session.take(mode);
        let files = retired
            .as_ref()
            .map(ModeState::owned_paths)
            .unwrap_or_default();
        let handles = retired
            .as_mut()
            .map(ModeState::handles_mut)
            .unwrap_or_default();

        self.cleanup(session, handles, &files, ResetSpec::fresh(mode))
    }

    /// Close and release a single staged input that is being replaced
    pub fn retire(&self, media: &mut StagedMedia) -> CleanupReport {
        let mut report = CleanupReport::default();
        match media.handle.close() {
            Ok(()) => report.handles_closed += 1,
            Err(DomainError::AlreadyClosed(_)) => report.already_closed += 1,
            Err(e) => report.close_failures.push(e.to_string()),
        }
        report.files = self.store.release([&media.file.path]);
        report
    }

    /// Remove staged files no session entry references
    pub fn sweep_orphans(&self, session: &SessionContext) -> ReleaseReport {
        self.store.sweep(&session.referenced_paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::RecordingHost;
    use tempfile::TempDir;

    fn staged(store: &TempFileStore, key: &IdentityToken) -> StagedMedia {
        let upload = Upload::new("clip.mp4", MediaKind::Video, b"duration=4".to_vec());
        let file = store.stage_upload(&upload, key).unwrap();
        let handle = MediaHandle::open(&file.path, MediaKind::Video, MediaInfo::video(4.0, 25.0, true));
        StagedMedia { file, handle }
    }

    fn manager(dir: &TempDir) -> (LifecycleManager, TempFileStore, Arc<RecordingHost>) {
        let store = TempFileStore::new(dir.path()).unwrap();
        let host = Arc::new(RecordingHost::new());
        (LifecycleManager::new(store.clone(), host.clone()), store, host)
    }

    #[test]
    fn test_clear_mode_releases_everything_and_regenerates_keys() {
        let dir = TempDir::new().unwrap();
        let (lifecycle, store, host) = manager(&dir);
        let mut session = SessionContext::new(SessionId::default());

        let old_key = session.concat_mut().key.clone();
        let first = staged(&store, &old_key);
        let second = staged(&store, &old_key);
        let paths = vec![first.file.path.clone(), second.file.path.clone()];
        session.concat_mut().clips.extend([first, second]);

        let report = lifecycle.clear_mode(&mut session, OperationMode::Concat);

        assert_eq!(report.handles_closed, 2);
        assert_eq!(report.files.removed.len(), 2);
        assert!(report.is_clean());
        assert!(paths.iter().all(|path| !path.exists()));

        let concat = session.concat().unwrap();
        assert!(concat.clips.is_empty());
        assert!(concat.output.is_none());
        assert_ne!(concat.key, old_key);

        assert_eq!(host.invalidations(), 1);
        assert_eq!(host.redraws(), 1);
    }

    #[test]
    fn test_cleanup_twice_is_harmless() {
        let dir = TempDir::new().unwrap();
        let (lifecycle, store, host) = manager(&dir);
        let mut session = SessionContext::new(SessionId::default());

        let key = session.trim_mut().key.clone();
        let mut media = staged(&store, &key);
        let files = vec![media.file.path.clone()];

        let first = lifecycle.cleanup(
            &mut session,
            [&mut media.handle],
            &files,
            ResetSpec::fresh(OperationMode::Trim),
        );
        let second = lifecycle.cleanup(
            &mut session,
            [&mut media.handle],
            &files,
            ResetSpec::fresh(OperationMode::Trim),
        );

        assert_eq!(first.handles_closed, 1);
        assert_eq!(first.files.removed.len(), 1);
        assert_eq!(second.handles_closed, 0);
        assert_eq!(second.already_closed, 1);
        assert!(second.files.removed.is_empty());
        assert_eq!(second.files.missing.len(), 1);
        assert!(second.is_clean());
        assert_eq!(host.redraws(), 2);
    }

    #[test]
    fn test_clear_unseeded_mode_still_resets() {
        let dir = TempDir::new().unwrap();
        let (lifecycle, _store, host) = manager(&dir);
        let mut session = SessionContext::new(SessionId::default());

        let report = lifecycle.clear_mode(&mut session, OperationMode::Music);

        assert_eq!(report.reset, Some(OperationMode::Music));
        assert!(session.music().is_some());
        assert_eq!(host.redraws(), 1);
    }

    #[test]
    fn test_clear_mode_leaves_other_modes_alone() {
        let dir = TempDir::new().unwrap();
        let (lifecycle, store, _host) = manager(&dir);
        let mut session = SessionContext::new(SessionId::default());

        let key = session.trim_mut().key.clone();
        let kept = staged(&store, &key);
        let kept_path = kept.file.path.clone();
        session.trim_mut().video = Some(kept);

        lifecycle.clear_mode(&mut session, OperationMode::Merge);

        assert!(kept_path.exists());
        assert!(session.trim().unwrap().video.is_some());
    }

    #[test]
    fn test_sweep_orphans_keeps_referenced_files() {
        let dir = TempDir::new().unwrap();
        let (lifecycle, store, _host) = manager(&dir);
        let mut session = SessionContext::new(SessionId::default());

        let key = session.trim_mut().key.clone();
        let kept = staged(&store, &key);
        let kept_path = kept.file.path.clone();
        session.trim_mut().video = Some(kept);
        let orphan = store.stage(b"left behind", ".mp4").unwrap();

        let report = lifecycle.sweep_orphans(&session);

        assert_eq!(report.removed, vec![orphan]);
        assert!(kept_path.exists());
    }
}
