//! vedit - Session-based video editing library
//!
//! Merge an audio track into a video, trim subclips, concatenate videos and
//! mix in background music. Uploads are staged per session and survive
//! between invocations until an operation is cleared.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use adapters::AppConfig;
pub use app::{AppContainer, DefaultAppContainer, SessionWorkspace};
pub use domain::errors::DomainError;
pub use domain::model::{MediaInfo, OperationMode, OutputArtifact, SessionId, Upload, Volume};
pub use error::{VeditError, VeditResult};
