// Trim interactor - Cuts a subclip out of an uploaded video

use std::sync::Arc;

use tracing::info;

use crate::app::executor::MediaOperationExecutor;
use crate::app::uploads::{open_handle, ReceiveReport, UploadStager};
use crate::app::workspace::SessionWorkspace;
use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::TrimRules;

/// Interactor for trimming subclips
pub struct TrimInteractor {
    stager: Arc<UploadStager>,
    executor: Arc<MediaOperationExecutor>,
}

impl TrimInteractor {
    pub fn new(stager: Arc<UploadStager>, executor: Arc<MediaOperationExecutor>) -> Self {
        Self { stager, executor }
    }

    /// Take this round's video into the trim slot
    pub async fn receive(
        &self,
        workspace: &mut SessionWorkspace,
        video: Option<&Upload>,
    ) -> Result<ReceiveReport, DomainError> {
        let lifecycle = &workspace.lifecycle;
        let state = workspace.context.trim_mut();

        match video {
            Some(upload) => {
                let key = state.key.clone();
                self.stager.accept_single(lifecycle, &mut state.video, upload, &key).await
            }
            None => Ok(ReceiveReport::default()),
        }
    }

    /// Cut `[start, end)` out of the staged video.
    ///
    /// Missing times default to the first five seconds. The staged video
    /// stays open so it can be trimmed again.
    pub async fn execute(
        &self,
        workspace: &mut SessionWorkspace,
        start: Option<f64>,
        end: Option<f64>,
    ) -> Result<OutputArtifact, DomainError> {
        let state = workspace.context.trim_mut();
        let video = open_handle(&state.video, "Upload a video to trim")?;

        let range = TrimRules::resolve_range(start, end, video.duration())?;
        info!(
            "Trimming {:.2}s-{:.2}s of a {:.2}s video",
            range.start,
            range.end,
            video.duration()
        );

        let composition = Composition::subclip(video, range)?;
        let artifact = self
            .executor
            .encode(OperationMode::Trim, &composition, &TrimRules::disambiguator(&range))
            .await?;

        workspace.context.trim_mut().record_output(artifact.clone());
        Ok(artifact)
    }
}
