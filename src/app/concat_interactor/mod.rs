// Concat interactor - Joins uploaded videos in upload order

use std::sync::Arc;

use crate::app::executor::MediaOperationExecutor;
use crate::app::uploads::{ReceiveReport, UploadStager};
use crate::app::workspace::SessionWorkspace;
use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Interactor for concatenating videos
pub struct ConcatInteractor {
    stager: Arc<UploadStager>,
    executor: Arc<MediaOperationExecutor>,
}

impl ConcatInteractor {
    pub fn new(stager: Arc<UploadStager>, executor: Arc<MediaOperationExecutor>) -> Self {
        Self { stager, executor }
    }

    /// Take this round's videos into the ordered clip list.
    ///
    /// An empty list keeps whatever is already staged.
    pub async fn receive(
        &self,
        workspace: &mut SessionWorkspace,
        videos: &[Upload],
    ) -> Result<ReceiveReport, DomainError> {
        let lifecycle = &workspace.lifecycle;
        let state = workspace.context.concat_mut();
        let key = state.key.clone();
        self.stager
            .accept_sequence(lifecycle, &mut state.clips, videos, &key)
            .await
    }

    /// Concatenate the staged clips in upload order
    pub async fn execute(&self, workspace: &mut SessionWorkspace) -> Result<OutputArtifact, DomainError> {
        let state = workspace.context.concat_mut();
        let handles: Vec<&MediaHandle> = state
            .clips
            .iter()
            .map(|clip| &clip.handle)
            .filter(|handle| handle.is_open())
            .collect();

        let composition = Composition::concatenate(&handles)?;
        let artifact = self.executor.encode(OperationMode::Concat, &composition, "").await?;

        workspace.context.concat_mut().record_output(artifact.clone());
        Ok(artifact)
    }
}
