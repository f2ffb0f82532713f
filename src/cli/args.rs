//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::adapters::console_host::ViewFormat;
use crate::domain::model::{OperationMode, Volume};

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Video file (mp4, mov, avi)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Audio file (mp3, wav)
    #[arg(long)]
    pub audio: Option<PathBuf>,
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Video file (mp4, mov, avi)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds) [default: 0]
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds) [default: 5]
    #[arg(short, long)]
    pub end: Option<String>,
}

/// Arguments for the concat command
#[derive(Args, Debug)]
pub struct ConcatArgs {
    /// Video files in the order they are joined; repeat the flag for each
    #[arg(long = "video")]
    pub videos: Vec<PathBuf>,
}

/// Arguments for the music command
#[derive(Args, Debug)]
pub struct MusicArgs {
    /// Video file (mp4, mov, avi)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Background music file (mp3, wav)
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Volume of the video's own audio (0.0-1.0)
    #[arg(long, default_value = "1.0")]
    pub original_volume: Volume,

    /// Volume of the background music (0.0-1.0)
    #[arg(long, default_value = "0.5")]
    pub music_volume: Volume,
}

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Operation to clear (merge, trim, concat, music)
    pub mode: OperationMode,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format (text, json, yaml)
    #[arg(long, default_value = "text")]
    pub format: ViewFormat,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Operation whose output is exported (merge, trim, concat, music)
    pub mode: OperationMode,

    /// Destination file or directory
    #[arg(long)]
    pub to: PathBuf,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
