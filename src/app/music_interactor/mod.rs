// Music interactor - Mixes a background track under a video's own audio

use std::sync::Arc;

use tracing::info;

use crate::app::executor::MediaOperationExecutor;
use crate::app::uploads::{open_handle, ReceiveReport, UploadStager};
use crate::app::workspace::SessionWorkspace;
use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Interactor for adding background music
pub struct MusicInteractor {
    stager: Arc<UploadStager>,
    executor: Arc<MediaOperationExecutor>,
}

impl MusicInteractor {
    pub fn new(stager: Arc<UploadStager>, executor: Arc<MediaOperationExecutor>) -> Self {
        Self { stager, executor }
    }

    /// Take this round's uploads into the background-music slots
    pub async fn receive(
        &self,
        workspace: &mut SessionWorkspace,
        video: Option<&Upload>,
        audio: Option<&Upload>,
    ) -> Result<ReceiveReport, DomainError> {
        let lifecycle = &workspace.lifecycle;
        let state = workspace.context.music_mut();
        let mut report = ReceiveReport::default();

        if let Some(upload) = video {
            let key = state.video_key.clone();
            report.absorb(self.stager.accept_single(lifecycle, &mut state.video, upload, &key).await?);
        }
        if let Some(upload) = audio {
            let key = state.audio_key.clone();
            report.absorb(self.stager.accept_single(lifecycle, &mut state.audio, upload, &key).await?);
        }

        Ok(report)
    }

    /// Mix the staged music under the staged video at the given volumes
    pub async fn execute(
        &self,
        workspace: &mut SessionWorkspace,
        original_volume: Volume,
        music_volume: Volume,
    ) -> Result<OutputArtifact, DomainError> {
        let state = workspace.context.music_mut();
        let video = open_handle(&state.video, "Upload a video to add music to")?;
        let music = open_handle(&state.audio, "Upload a background music track")?;

        if !video.info.has_audio {
            info!("Video has no audio of its own; output carries the music alone");
        }

        let composition = Composition::background_music(video, music, original_volume, music_volume)?;
        let artifact = self.executor.encode(OperationMode::Music, &composition, "").await?;

        workspace.context.music_mut().record_output(artifact.clone());
        Ok(artifact)
    }
}
