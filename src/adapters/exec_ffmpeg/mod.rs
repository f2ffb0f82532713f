//! FFmpeg execution adapter
//!
//! Turns a [`Composition`] into an ffmpeg command line, runs it with
//! `-progress pipe:1` and forwards the reported frame counts to the sink.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::composition::*;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Lines of stderr kept for error reports
const STDERR_TAIL_LINES: usize = 20;

fn seconds(value: f64) -> String {
    format!("{:.3}", value)
}

/// Filter graph and stream mapping for a composition
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    pub filter_complex: Option<String>,
    pub maps: Vec<String>,
}

/// Build the filter graph that lays out video and audio
pub fn plan_filters(composition: &Composition) -> FilterPlan {
    let mut filters: Vec<String> = Vec::new();
    let mut maps: Vec<String> = Vec::new();

    match &composition.timeline {
        Timeline::Single { input } => {
            maps.push(format!("{}:v:0", input));
            if composition.audio == AudioTrack::Inherit {
                maps.push(format!("{}:a:0?", input));
            }
        }
        Timeline::Sequence { inputs } => {
            let with_audio = composition.audio == AudioTrack::Inherit
                && inputs
                    .iter()
                    .filter_map(|index| composition.inputs.get(*index))
                    .any(|input| input.info.has_audio);

            let mut segments = String::new();
            for (position, index) in inputs.iter().enumerate() {
                segments.push_str(&format!("[{}:v:0]", index));
                if !with_audio {
                    continue;
                }
                match composition.inputs.get(*index) {
                    Some(input) if input.info.has_audio => {
                        segments.push_str(&format!("[{}:a:0]", index));
                    }
                    Some(input) => {
                        // Silent padding keeps segments aligned when a clip has no audio
                        filters.push(format!(
                            "aevalsrc=0:channel_layout=stereo:sample_rate=44100:d={}[pad{}]",
                            seconds(input.effective_duration()),
                            position
                        ));
                        segments.push_str(&format!("[pad{}]", position));
                    }
                    None => {}
                }
            }

            if with_audio {
                filters.push(format!(
                    "{}concat=n={}:v=1:a=1[vout][aout]",
                    segments,
                    inputs.len()
                ));
                maps.push("[vout]".to_string());
                maps.push("[aout]".to_string());
            } else {
                filters.push(format!("{}concat=n={}:v=1:a=0[vout]", segments, inputs.len()));
                maps.push("[vout]".to_string());
            }
        }
    }

    if let AudioTrack::Layers(layers) = &composition.audio {
        let labels: Vec<String> = layers
            .iter()
            .enumerate()
            .map(|(position, layer)| {
                filters.push(format!(
                    "[{}:a:0]volume={}[layer{}]",
                    layer.input, layer.gain, position
                ));
                format!("[layer{}]", position)
            })
            .collect();

        match labels.len() {
            0 => {}
            1 => maps.push(labels[0].clone()),
            count => {
                filters.push(format!(
                    "{}amix=inputs={}:duration=longest:normalize=0[aout]",
                    labels.concat(),
                    count
                ));
                maps.push("[aout]".to_string());
            }
        }
    }

    FilterPlan {
        filter_complex: (!filters.is_empty()).then(|| filters.join(";")),
        maps,
    }
}

/// Full ffmpeg argument list for one encode
pub fn build_args(composition: &Composition, settings: &EncodeSettings, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec!["-hide_banner".into(), "-v".into(), "error".into()];

    for input in &composition.inputs {
        if let Some(window) = input.window {
            args.extend(["-ss".into(), seconds(window.start)]);
            args.extend(["-t".into(), seconds(window.length())]);
        }
        args.extend(["-i".into(), input.path.to_string_lossy().to_string()]);
    }

    let plan = plan_filters(composition);
    if let Some(graph) = plan.filter_complex {
        args.extend(["-filter_complex".into(), graph]);
    }
    for map in plan.maps {
        args.extend(["-map".into(), map]);
    }

    args.extend(["-c:v".into(), settings.video_codec.encoder_name().into()]);
    args.extend(["-c:a".into(), settings.audio_codec.encoder_name().into()]);
    if settings.threads > 0 {
        args.extend(["-threads".into(), settings.threads.to_string()]);
    }

    args.extend([
        "-progress".into(),
        "pipe:1".into(),
        "-nostats".into(),
        "-y".into(),
        output.to_string_lossy().to_string(),
    ]);
    args
}

/// Frame count from one `-progress` line, if it carries one
pub fn parse_progress_frame(line: &str) -> Option<u64> {
    line.trim().strip_prefix("frame=")?.trim().parse().ok()
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    binary: PathBuf,
}

impl FfmpegAdapter {
    /// Create an adapter running the given ffmpeg binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ExecutePort for FfmpegAdapter {
    async fn encode(
        &self,
        composition: &Composition,
        settings: &EncodeSettings,
        output: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), DomainError> {
        let args = build_args(composition, settings, output);
        let total = composition.total_frames();
        info!("Encoding {} input(s) into {}", composition.inputs.len(), output.display());
        debug!("{} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DomainError::Backend(format!("Failed to run {}: {}", self.binary.display(), e))
            })?;

        // Drain stderr concurrently so a chatty encoder cannot block on a full pipe
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buffer = Vec::new();
                let _ = stderr.read_to_end(&mut buffer).await;
                buffer
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(frame) = parse_progress_frame(&line) {
                    sink.on_progress("frame", frame, total);
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::Backend(format!("Failed to wait for ffmpeg: {}", e)))?;

        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => Vec::new(),
        };

        if !status.success() {
            let tail = stderr_tail(&stderr);
            return Err(DomainError::Backend(if tail.is_empty() {
                format!("ffmpeg exited with {}", status)
            } else {
                format!("ffmpeg exited with {}: {}", status, tail)
            }));
        }

        Ok(())
    }
}
