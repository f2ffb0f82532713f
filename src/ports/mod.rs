// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::session::SessionContext;

/// Port for opening media files through the external backend
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Open a staged file and report its duration, frame rate and streams
    async fn open(&self, path: &Path, kind: MediaKind) -> Result<MediaHandle, DomainError>;
}

/// Receiver of encoder progress.
///
/// The backend calls it synchronously from inside the encode, with a label,
/// the units completed so far, and the total it expects.
pub trait ProgressSink: Send {
    fn on_progress(&mut self, label: &str, current: u64, total: u64);
}

/// Port for encoding a composition into a file
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Encode the composition to `output`, streaming progress into `sink`
    async fn encode(
        &self,
        composition: &Composition,
        settings: &EncodeSettings,
        output: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), DomainError>;
}

/// Port for persisting session state between interaction rounds
#[async_trait]
pub trait SessionPort: Send + Sync {
    /// Load a session, or an empty one if it has never been saved
    async fn load(&self, id: &SessionId) -> Result<SessionContext, DomainError>;

    /// Persist a session
    async fn save(&self, session: &SessionContext) -> Result<(), DomainError>;

    /// Directory holding the session's staged files
    fn staging_dir(&self, id: &SessionId) -> PathBuf;

    /// Ids of all persisted sessions
    async fn list(&self) -> Result<Vec<SessionId>, DomainError>;
}

/// The interface the user interacts with
pub trait InteractionHost: Send + Sync {
    /// Drop any view state derived from the session
    fn invalidate_caches(&self);

    /// Render the interface again from the session's current state
    fn request_redraw(&self, session: &SessionContext);

    /// Present a finished artifact for preview and download
    fn offer_artifact(&self, mode: OperationMode, artifact: &OutputArtifact);
}
