// Adapters - External system implementations

pub mod console_host;
pub mod exec_ffmpeg;
pub mod fs_staging;
pub mod mock;
pub mod probe_ffprobe;
pub mod session_json;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use console_host::{ConsoleHost, SessionView, ViewFormat};
pub use exec_ffmpeg::FfmpegAdapter;
pub use fs_staging::{ReleaseReport, TempFileStore};
pub use mock::{MockExecuteAdapter, MockProbeAdapter, RecordingHost};
pub use probe_ffprobe::FfprobeAdapter;
pub use session_json::JsonSessionStore;
pub use toml_config::AppConfig;
pub use tracing_log::{LogFormat, TracingLogAdapter};
