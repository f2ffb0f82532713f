//! Progress reporting and resource lifecycle shared by every operation

pub mod lifecycle;
pub mod progress;

pub use lifecycle::{CleanupReport, LifecycleManager, ResetSpec};
pub use progress::{
    ConsoleRenderer, JsonRenderer, ProgressFrame, ProgressRenderer, ProgressReporter,
    ProgressStyle, SilentRenderer,
};
