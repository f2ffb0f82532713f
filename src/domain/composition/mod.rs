//! Derived media descriptions handed to the encoding backend
//!
//! A [`Composition`] is what an operation builds in memory before anything is
//! encoded: which inputs are read (and which window of each), how the video
//! timeline is laid out, and where the audio comes from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{AudioRules, FrameBudget, FALLBACK_FRAME_RATE};

/// One file read by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionInput {
    pub path: PathBuf,
    pub info: MediaInfo,
    /// Portion of the file that is read; the whole file when absent
    pub window: Option<TimeRange>,
}

impl CompositionInput {
    fn whole(handle: &MediaHandle) -> Self {
        Self {
            path: handle.path.clone(),
            info: handle.info.clone(),
            window: None,
        }
    }

    fn windowed(handle: &MediaHandle, window: TimeRange) -> Self {
        Self {
            path: handle.path.clone(),
            info: handle.info.clone(),
            window: Some(window),
        }
    }

    /// Seconds of media this input contributes
    pub fn effective_duration(&self) -> f64 {
        match self.window {
            Some(window) => window.length(),
            None => self.info.duration,
        }
    }
}

/// Layout of the video timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Timeline {
    /// Video of a single input
    Single { input: usize },
    /// Inputs played back to back in the given order
    Sequence { inputs: Vec<usize> },
}

/// Audio of one input scaled by a gain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioLayer {
    pub input: usize,
    pub gain: f64,
}

/// Where the output's audio comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioTrack {
    /// Keep the audio of the timeline inputs
    Inherit,
    /// Replace it with the sum of these layers
    Layers(Vec<AudioLayer>),
}

/// Complete description of one encode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub inputs: Vec<CompositionInput>,
    pub timeline: Timeline,
    pub audio: AudioTrack,
}

impl Composition {
    /// `[start, end)` of a video, keeping its own audio
    pub fn subclip(video: &MediaHandle, range: TimeRange) -> Result<Self, DomainError> {
        range.validate_within(video.duration())?;
        Ok(Self {
            inputs: vec![CompositionInput::windowed(video, range)],
            timeline: Timeline::Single { input: 0 },
            audio: AudioTrack::Inherit,
        })
    }

    /// Video with its audio replaced by the audio track, capped to the video length
    pub fn merge_audio(video: &MediaHandle, audio: &MediaHandle) -> Result<Self, DomainError> {
        let window = AudioRules::capped_window(&audio.info, &video.info)?;
        Ok(Self {
            inputs: vec![
                CompositionInput::whole(video),
                CompositionInput::windowed(audio, window),
            ],
            timeline: Timeline::Single { input: 0 },
            audio: AudioTrack::Layers(vec![AudioLayer { input: 1, gain: 1.0 }]),
        })
    }

    /// Videos back to back in the given order
    pub fn concatenate(videos: &[&MediaHandle]) -> Result<Self, DomainError> {
        if videos.is_empty() {
            return Err(DomainError::MissingUpload(
                "Upload at least one video to concatenate".to_string(),
            ));
        }
        Ok(Self {
            inputs: videos.iter().map(|handle| CompositionInput::whole(handle)).collect(),
            timeline: Timeline::Sequence {
                inputs: (0..videos.len()).collect(),
            },
            audio: AudioTrack::Inherit,
        })
    }

    /// Video's own audio and a music track, each scaled, summed into one stream
    pub fn background_music(
        video: &MediaHandle,
        music: &MediaHandle,
        original_volume: Volume,
        music_volume: Volume,
    ) -> Result<Self, DomainError> {
        let window = AudioRules::capped_window(&music.info, &video.info)?;
        let mut layers = Vec::with_capacity(2);
        if video.info.has_audio {
            layers.push(AudioLayer {
                input: 0,
                gain: original_volume.value(),
            });
        }
        layers.push(AudioLayer {
            input: 1,
            gain: music_volume.value(),
        });

        Ok(Self {
            inputs: vec![
                CompositionInput::whole(video),
                CompositionInput::windowed(music, window),
            ],
            timeline: Timeline::Single { input: 0 },
            audio: AudioTrack::Layers(layers),
        })
    }

    /// Indices of the inputs making up the video timeline, in playback order
    pub fn timeline_inputs(&self) -> Vec<usize> {
        match &self.timeline {
            Timeline::Single { input } => vec![*input],
            Timeline::Sequence { inputs } => inputs.clone(),
        }
    }

    /// Length of the video timeline in seconds
    pub fn duration(&self) -> f64 {
        self.timeline_inputs()
            .iter()
            .filter_map(|index| self.inputs.get(*index))
            .map(CompositionInput::effective_duration)
            .sum()
    }

    /// Length of the audio portion in seconds
    pub fn audio_duration(&self) -> f64 {
        match &self.audio {
            AudioTrack::Inherit => {
                let any_audio = self
                    .timeline_inputs()
                    .iter()
                    .filter_map(|index| self.inputs.get(*index))
                    .any(|input| input.info.has_audio);
                if any_audio {
                    self.duration()
                } else {
                    0.0
                }
            }
            AudioTrack::Layers(layers) => layers
                .iter()
                .filter_map(|layer| self.inputs.get(layer.input))
                .map(|input| input.effective_duration().min(self.duration()))
                .fold(0.0, f64::max),
        }
    }

    /// Highest frame rate among timeline inputs
    pub fn frame_rate(&self) -> f64 {
        self.timeline_inputs()
            .iter()
            .filter_map(|index| self.inputs.get(*index))
            .filter_map(|input| input.info.frame_rate)
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .fold(None, |best: Option<f64>, fps| Some(best.map_or(fps, |b| b.max(fps))))
            .unwrap_or(FALLBACK_FRAME_RATE)
    }

    /// Frames the encoder is expected to produce
    pub fn total_frames(&self) -> u64 {
        FrameBudget::total_frames(self.frame_rate(), self.duration())
    }

    /// Upper bound on the summed amplitude relative to unity-gain sources
    pub fn peak_gain(&self) -> f64 {
        match &self.audio {
            AudioTrack::Inherit => 1.0,
            AudioTrack::Layers(layers) => layers.iter().map(|layer| layer.gain).sum(),
        }
    }

    /// Source paths of the timeline, in playback order
    pub fn timeline_paths(&self) -> Vec<PathBuf> {
        self.timeline_inputs()
            .iter()
            .filter_map(|index| self.inputs.get(*index))
            .map(|input| input.path.clone())
            .collect()
    }
}
