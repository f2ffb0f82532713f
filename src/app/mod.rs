// Application layer - Use case interactors

pub mod concat_interactor;
pub mod container;
pub mod executor;
pub mod inspect_interactor;
pub mod merge_interactor;
pub mod music_interactor;
pub mod trim_interactor;
pub mod uploads;
pub mod workspace;

// Re-export interactors
pub use concat_interactor::ConcatInteractor;
pub use container::{AppContainer, DefaultAppContainer};
pub use executor::MediaOperationExecutor;
pub use inspect_interactor::InspectInteractor;
pub use merge_interactor::MergeInteractor;
pub use music_interactor::MusicInteractor;
pub use trim_interactor::TrimInteractor;
pub use uploads::{ReceiveReport, UploadStager};
pub use workspace::SessionWorkspace;
