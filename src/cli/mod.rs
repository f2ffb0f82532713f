//! CLI module for vedit
//!
//! This module handles command-line argument parsing and command execution.
//! Every invocation is one round of an editing session: uploads are staged,
//! the session is saved, and the requested operation runs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::model::SessionId;

pub mod args;
pub mod commands;

/// vedit - Session-based video editing
///
/// Merge audio into a video, trim subclips, concatenate videos and add
/// background music. Uploads stay staged in the session between invocations.
#[derive(Parser, Debug)]
#[command(name = "vedit")]
#[command(about = "vedit - Merge, trim, concatenate and score videos from the command line")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Session to work in
    #[arg(long, env = "VEDIT_SESSION", default_value = "default", global = true)]
    pub session: SessionId,

    /// Configuration file (default: vedit.toml or config/vedit.toml)
    #[arg(long, env = "VEDIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Video codec (libx264, mpeg4, libvpx)
    #[arg(long, global = true)]
    pub video_codec: Option<String>,

    /// Audio codec (aac, libvorbis, mp3)
    #[arg(long, global = true)]
    pub audio_codec: Option<String>,

    /// Progress display (bar, json, none)
    #[arg(long, global = true)]
    pub progress: Option<String>,

    /// Directory for output files
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Directory for session state and staged uploads
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace a video's audio track with an audio file
    Merge(args::MergeArgs),
    /// Cut a subclip out of a video
    Trim(args::TrimArgs),
    /// Join videos in the order given
    Concat(args::ConcatArgs),
    /// Mix background music under a video's own audio
    Music(args::MusicArgs),
    /// Release everything an operation holds and start it afresh
    Clear(args::ClearArgs),
    /// Show what the session has staged
    Status(args::StatusArgs),
    /// Copy an operation's latest output somewhere else
    Export(args::ExportArgs),
    /// Inspect a media file
    Inspect(args::InspectArgs),
    /// List saved sessions
    Sessions,
}

impl Commands {
    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Merge(_) => "merge",
            Commands::Trim(_) => "trim",
            Commands::Concat(_) => "concat",
            Commands::Music(_) => "music",
            Commands::Clear(_) => "clear",
            Commands::Status(_) => "status",
            Commands::Export(_) => "export",
            Commands::Inspect(_) => "inspect",
            Commands::Sessions => "sessions",
        }
    }
}
