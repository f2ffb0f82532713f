// App container - Wires adapters into interactors and session workspaces

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::{AppConfig, FfmpegAdapter, FfprobeAdapter, JsonSessionStore, TempFileStore};
use crate::app::{
    concat_interactor::ConcatInteractor, executor::MediaOperationExecutor,
    inspect_interactor::InspectInteractor, merge_interactor::MergeInteractor,
    music_interactor::MusicInteractor, trim_interactor::TrimInteractor, uploads::UploadStager,
    workspace::SessionWorkspace,
};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::lifecycle::{CleanupReport, LifecycleManager};
use crate::engine::progress::ProgressStyle;
use crate::ports::{ExecutePort, InteractionHost, ProbePort, SessionPort};

pub trait AppContainer: Send + Sync {
    fn merge_interactor(&self) -> Arc<MergeInteractor>;
    fn trim_interactor(&self) -> Arc<TrimInteractor>;
    fn concat_interactor(&self) -> Arc<ConcatInteractor>;
    fn music_interactor(&self) -> Arc<MusicInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    session_port: Arc<dyn SessionPort>,
    host: Arc<dyn InteractionHost>,
    merge_interactor: Arc<MergeInteractor>,
    trim_interactor: Arc<TrimInteractor>,
    concat_interactor: Arc<ConcatInteractor>,
    music_interactor: Arc<MusicInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Container backed by ffprobe, ffmpeg and JSON session files
    pub fn new(config: &AppConfig, host: Arc<dyn InteractionHost>) -> Self {
        let probe_port = Arc::new(FfprobeAdapter::new(config.ffprobe.clone()));
        let execute_port = Arc::new(FfmpegAdapter::new(config.ffmpeg.clone()));
        let session_port = Arc::new(JsonSessionStore::new(&config.state_dir));

        Self::with_ports(
            probe_port,
            execute_port,
            session_port,
            host,
            config.encode_settings(),
            config.output_dir.clone(),
            config.progress,
        )
    }

    /// Container over explicit ports
    pub fn with_ports(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        session_port: Arc<dyn SessionPort>,
        host: Arc<dyn InteractionHost>,
        settings: EncodeSettings,
        output_dir: PathBuf,
        progress: ProgressStyle,
    ) -> Self {
        let stager = Arc::new(UploadStager::new(Arc::clone(&probe_port)));
        let executor = Arc::new(MediaOperationExecutor::new(
            execute_port,
            Arc::clone(&host),
            settings,
            output_dir,
            progress,
        ));

        Self {
            session_port,
            merge_interactor: Arc::new(MergeInteractor::new(Arc::clone(&stager), Arc::clone(&executor))),
            trim_interactor: Arc::new(TrimInteractor::new(Arc::clone(&stager), Arc::clone(&executor))),
            concat_interactor: Arc::new(ConcatInteractor::new(Arc::clone(&stager), Arc::clone(&executor))),
            music_interactor: Arc::new(MusicInteractor::new(stager, executor)),
            inspect_interactor: Arc::new(InspectInteractor::new(probe_port)),
            host,
        }
    }

    /// Load a session and remove staged files it no longer references
    pub async fn open_workspace(&self, id: &SessionId) -> Result<SessionWorkspace, DomainError> {
        let context = self.session_port.load(id).await?;
        let store = TempFileStore::new(self.session_port.staging_dir(id))?;
        let lifecycle = LifecycleManager::new(store, Arc::clone(&self.host));

        let swept = lifecycle.sweep_orphans(&context);
        if !swept.removed.is_empty() {
            info!("Removed {} orphaned staged files for session {}", swept.removed.len(), id);
        }

        debug!("Opened session {}", id);
        Ok(SessionWorkspace::new(context, lifecycle))
    }

    pub async fn save_workspace(&self, workspace: &SessionWorkspace) -> Result<(), DomainError> {
        self.session_port.save(&workspace.context).await
    }

    /// Release everything a mode holds and reset it to a fresh state
    pub fn clear(&self, workspace: &mut SessionWorkspace, mode: OperationMode) -> CleanupReport {
        workspace.lifecycle.clear_mode(&mut workspace.context, mode)
    }

    /// Copy a mode's current output to `destination`
    pub async fn export(
        &self,
        workspace: &SessionWorkspace,
        mode: OperationMode,
        destination: &Path,
    ) -> Result<PathBuf, DomainError> {
        let output = workspace
            .context
            .mode_state(mode)
            .and_then(|state| state.output().cloned())
            .ok_or_else(|| {
                DomainError::MissingUpload(format!("{} has no output to export yet", mode.title()))
            })?;

        let target = if destination.is_dir() {
            destination.join(output.file_name())
        } else {
            destination.to_path_buf()
        };

        tokio::fs::copy(&output.path, &target).await.map_err(|e| {
            DomainError::Io(format!(
                "Failed to export {} to {}: {}",
                output.path.display(),
                target.display(),
                e
            ))
        })?;
        info!("Exported {} to {}", output.file_name(), target.display());
        Ok(target)
    }

    /// Ids of every persisted session
    pub async fn sessions(&self) -> Result<Vec<SessionId>, DomainError> {
        self.session_port.list().await
    }
}

impl AppContainer for DefaultAppContainer {
    fn merge_interactor(&self) -> Arc<MergeInteractor> {
        Arc::clone(&self.merge_interactor)
    }

    fn trim_interactor(&self) -> Arc<TrimInteractor> {
        Arc::clone(&self.trim_interactor)
    }

    fn concat_interactor(&self) -> Arc<ConcatInteractor> {
        Arc::clone(&self.concat_interactor)
    }

    fn music_interactor(&self) -> Arc<MusicInteractor> {
        Arc::clone(&self.music_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
