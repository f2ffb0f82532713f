// Session state - Typed per-mode slots surviving across interaction rounds

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::*;

fn record_output(
    output: &mut Option<OutputArtifact>,
    superseded: &mut Vec<OutputArtifact>,
    artifact: OutputArtifact,
) {
    if let Some(previous) = output.replace(artifact) {
        superseded.push(previous);
    }
}

/// State of the merge-audio operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeState {
    pub video: Option<StagedMedia>,
    pub audio: Option<StagedMedia>,
    pub output: Option<OutputArtifact>,
    /// Earlier outputs of this mode, deleted with it on the next cleanup
    #[serde(default)]
    pub superseded: Vec<OutputArtifact>,
    pub video_key: IdentityToken,
    pub audio_key: IdentityToken,
}

impl MergeState {
    /// Install a new output, keeping the one it replaces for cleanup
    pub fn record_output(&mut self, artifact: OutputArtifact) {
        record_output(&mut self.output, &mut self.superseded, artifact);
    }

    pub fn fresh() -> Self {
        Self {
            video: None,
            audio: None,
            output: None,
            superseded: Vec::new(),
            video_key: IdentityToken::generate("video_key_merge"),
            audio_key: IdentityToken::generate("audio_key_merge"),
        }
    }
}

/// State of the trim operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimState {
    pub video: Option<StagedMedia>,
    pub output: Option<OutputArtifact>,
    /// Earlier outputs of this mode, deleted with it on the next cleanup
    #[serde(default)]
    pub superseded: Vec<OutputArtifact>,
    pub key: IdentityToken,
}

impl TrimState {
    /// Install a new output, keeping the one it replaces for cleanup
    pub fn record_output(&mut self, artifact: OutputArtifact) {
        record_output(&mut self.output, &mut self.superseded, artifact);
    }

    pub fn fresh() -> Self {
        Self {
            video: None,
            output: None,
            superseded: Vec::new(),
            key: IdentityToken::generate("subclip_key"),
        }
    }
}

/// State of the concatenate operation; clips are kept in upload order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcatState {
    pub clips: Vec<StagedMedia>,
    pub output: Option<OutputArtifact>,
    /// Earlier outputs of this mode, deleted with it on the next cleanup
    #[serde(default)]
    pub superseded: Vec<OutputArtifact>,
    pub key: IdentityToken,
}

impl ConcatState {
    /// Install a new output, keeping the one it replaces for cleanup
    pub fn record_output(&mut self, artifact: OutputArtifact) {
        record_output(&mut self.output, &mut self.superseded, artifact);
    }

    pub fn fresh() -> Self {
        Self {
            clips: Vec::new(),
            output: None,
            superseded: Vec::new(),
            key: IdentityToken::generate("concat_key"),
        }
    }
}

/// State of the background-music operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundState {
    pub video: Option<StagedMedia>,
    pub audio: Option<StagedMedia>,
    pub output: Option<OutputArtifact>,
    /// Earlier outputs of this mode, deleted with it on the next cleanup
    #[serde(default)]
    pub superseded: Vec<OutputArtifact>,
    pub video_key: IdentityToken,
    pub audio_key: IdentityToken,
}

impl BackgroundState {
    /// Install a new output, keeping the one it replaces for cleanup
    pub fn record_output(&mut self, artifact: OutputArtifact) {
        record_output(&mut self.output, &mut self.superseded, artifact);
    }

    pub fn fresh() -> Self {
        Self {
            video: None,
            audio: None,
            output: None,
            superseded: Vec::new(),
            video_key: IdentityToken::generate("video_key_bg"),
            audio_key: IdentityToken::generate("audio_key_bg"),
        }
    }
}

/// State of any one mode, used when a mode is retired or reset as a whole
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    Merge(MergeState),
    Trim(TrimState),
    Concat(ConcatState),
    Music(BackgroundState),
}

impl ModeState {
    /// Freshly seeded state for a mode
    pub fn fresh(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Merge => ModeState::Merge(MergeState::fresh()),
            OperationMode::Trim => ModeState::Trim(TrimState::fresh()),
            OperationMode::Concat => ModeState::Concat(ConcatState::fresh()),
            OperationMode::Music => ModeState::Music(BackgroundState::fresh()),
        }
    }

    pub fn mode(&self) -> OperationMode {
        match self {
            ModeState::Merge(_) => OperationMode::Merge,
            ModeState::Trim(_) => OperationMode::Trim,
            ModeState::Concat(_) => OperationMode::Concat,
            ModeState::Music(_) => OperationMode::Music,
        }
    }

    fn staged(&self) -> Vec<&StagedMedia> {
        match self {
            ModeState::Merge(state) => state.video.iter().chain(state.audio.iter()).collect(),
            ModeState::Trim(state) => state.video.iter().collect(),
            ModeState::Concat(state) => state.clips.iter().collect(),
            ModeState::Music(state) => state.video.iter().chain(state.audio.iter()).collect(),
        }
    }

    /// Current output artifact, if any
    pub fn output(&self) -> Option<&OutputArtifact> {
        match self {
            ModeState::Merge(state) => state.output.as_ref(),
            ModeState::Trim(state) => state.output.as_ref(),
            ModeState::Concat(state) => state.output.as_ref(),
            ModeState::Music(state) => state.output.as_ref(),
        }
    }

    /// Outputs replaced by later runs of this mode
    pub fn superseded(&self) -> &[OutputArtifact] {
        match self {
            ModeState::Merge(state) => &state.superseded,
            ModeState::Trim(state) => &state.superseded,
            ModeState::Concat(state) => &state.superseded,
            ModeState::Music(state) => &state.superseded,
        }
    }

    /// Paths of staged files, in slot order
    pub fn staged_paths(&self) -> Vec<PathBuf> {
        self.staged().into_iter().map(|media| media.file.path.clone()).collect()
    }

    /// Every file this state owns: staged files, superseded outputs, then the current output
    pub fn owned_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.staged_paths();
        paths.extend(self.superseded().iter().map(|artifact| artifact.path.clone()));
        if let Some(output) = self.output() {
            paths.push(output.path.clone());
        }
        paths
    }

    /// Mutable access to every media handle held by this state
    pub fn handles_mut(&mut self) -> Vec<&mut MediaHandle> {
        match self {
            ModeState::Merge(state) => state
                .video
                .iter_mut()
                .chain(state.audio.iter_mut())
                .map(|media| &mut media.handle)
                .collect(),
            ModeState::Trim(state) => state.video.iter_mut().map(|media| &mut media.handle).collect(),
            ModeState::Concat(state) => state.clips.iter_mut().map(|media| &mut media.handle).collect(),
            ModeState::Music(state) => state
                .video
                .iter_mut()
                .chain(state.audio.iter_mut())
                .map(|media| &mut media.handle)
                .collect(),
        }
    }
}

/// Per-session context passed to every operation.
///
/// Each mode's slots are seeded on first access and are independent of the
/// others, so switching modes and back keeps in-flight uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub id: SessionId,
    #[serde(default)]
    merge: Option<MergeState>,
    #[serde(default)]
    trim: Option<TrimState>,
    #[serde(default)]
    concat: Option<ConcatState>,
    #[serde(default)]
    music: Option<BackgroundState>,
    /// Mode used in the most recent round
    #[serde(default)]
    pub active_mode: Option<OperationMode>,
}

impl SessionContext {
    /// Create an empty session
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            merge: None,
            trim: None,
            concat: None,
            music: None,
            active_mode: None,
        }
    }

    pub fn merge(&self) -> Option<&MergeState> {
        self.merge.as_ref()
    }

    pub fn trim(&self) -> Option<&TrimState> {
        self.trim.as_ref()
    }

    pub fn concat(&self) -> Option<&ConcatState> {
        self.concat.as_ref()
    }

    pub fn music(&self) -> Option<&BackgroundState> {
        self.music.as_ref()
    }

    /// Merge state, seeded on first access
    pub fn merge_mut(&mut self) -> &mut MergeState {
        self.active_mode = Some(OperationMode::Merge);
        self.merge.get_or_insert_with(MergeState::fresh)
    }

    /// Trim state, seeded on first access
    pub fn trim_mut(&mut self) -> &mut TrimState {
        self.active_mode = Some(OperationMode::Trim);
        self.trim.get_or_insert_with(TrimState::fresh)
    }

    /// Concat state, seeded on first access
    pub fn concat_mut(&mut self) -> &mut ConcatState {
        self.active_mode = Some(OperationMode::Concat);
        self.concat.get_or_insert_with(ConcatState::fresh)
    }

    /// Background-music state, seeded on first access
    pub fn music_mut(&mut self) -> &mut BackgroundState {
        self.active_mode = Some(OperationMode::Music);
        self.music.get_or_insert_with(BackgroundState::fresh)
    }

    /// Snapshot of one mode's state, if it has been seeded
    pub fn mode_state(&self, mode: OperationMode) -> Option<ModeState> {
        match mode {
            OperationMode::Merge => self.merge.clone().map(ModeState::Merge),
            OperationMode::Trim => self.trim.clone().map(ModeState::Trim),
            OperationMode::Concat => self.concat.clone().map(ModeState::Concat),
            OperationMode::Music => self.music.clone().map(ModeState::Music),
        }
    }

    /// Remove one mode's state from the session
    pub fn take(&mut self, mode: OperationMode) -> Option<ModeState> {
        match mode {
            OperationMode::Merge => self.merge.take().map(ModeState::Merge),
            OperationMode::Trim => self.trim.take().map(ModeState::Trim),
            OperationMode::Concat => self.concat.take().map(ModeState::Concat),
            OperationMode::Music => self.music.take().map(ModeState::Music),
        }
    }

    /// Replace one mode's state
    pub fn install(&mut self, state: ModeState) {
        match state {
            ModeState::Merge(state) => self.merge = Some(state),
            ModeState::Trim(state) => self.trim = Some(state),
            ModeState::Concat(state) => self.concat = Some(state),
            ModeState::Music(state) => self.music = Some(state),
        }
    }

    /// Every path any mode of this session still owns
    pub fn referenced_paths(&self) -> Vec<PathBuf> {
        OperationMode::all()
            .iter()
            .filter_map(|mode| self.mode_state(*mode))
            .flat_map(|state| state.owned_paths())
            .collect()
    }
}
