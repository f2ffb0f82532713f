// Merge interactor - Replaces a video's audio with an uploaded track

use std::sync::Arc;

use crate::app::executor::MediaOperationExecutor;
use crate::app::uploads::{open_handle, ReceiveReport, UploadStager};
use crate::app::workspace::SessionWorkspace;
use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Interactor for merging audio into a video
pub struct MergeInteractor {
    stager: Arc<UploadStager>,
    executor: Arc<MediaOperationExecutor>,
}

impl MergeInteractor {
    pub fn new(stager: Arc<UploadStager>, executor: Arc<MediaOperationExecutor>) -> Self {
        Self { stager, executor }
    }

    /// Take this round's uploads into the merge slots
    pub async fn receive(
        &self,
        workspace: &mut SessionWorkspace,
        video: Option<&Upload>,
        audio: Option<&Upload>,
    ) -> Result<ReceiveReport, DomainError> {
        let lifecycle = &workspace.lifecycle;
        let state = workspace.context.merge_mut();
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

    /// Merge the staged audio into the staged video
    pub async fn execute(&self, workspace: &mut SessionWorkspace) -> Result<OutputArtifact, DomainError> {
        let state = workspace.context.merge_mut();
        let video = open_handle(&state.video, "Upload a video to merge audio into")?;
        let audio = open_handle(&state.audio, "Upload an audio track to merge")?;

        let composition = Composition::merge_audio(video, audio)?;
        let artifact = self.executor.encode(OperationMode::Merge, &composition, "").await?;

        workspace.context.merge_mut().record_output(artifact.clone());
        Ok(artifact)
    }
}
