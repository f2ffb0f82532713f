// Media operation executor - Encodes compositions into output artifacts

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::domain::composition::Composition;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::OutputNaming;
use crate::engine::progress::{ProgressRenderer, ProgressReporter, ProgressStyle};
use crate::ports::*;

/// Upper bound on numbered alternatives tried for one output name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Builds a fresh renderer for each encode
pub type RendererFactory = Arc<dyn Fn() -> Box<dyn ProgressRenderer> + Send + Sync>;

/// Reserve an output path in `dir`, appending `-N` when the name is taken.
///
/// The file is created empty so a concurrent session cannot claim the same name.
pub fn reserve_output_path(dir: &Path, file_name: &str) -> Result<PathBuf, DomainError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        DomainError::Io(format!("Failed to create output directory {}: {}", dir.display(), e))
    })?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            dir.join(file_name)
        } else {
            dir.join(OutputNaming::numbered(file_name, attempt))
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(DomainError::Io(format!(
                    "Failed to create {}: {}",
                    candidate.display(),
                    e
                )))
            }
        }
    }

    Err(DomainError::Io(format!(
        "No free output name for {} in {}",
        file_name,
        dir.display()
    )))
}

/// Third phase shared by every operation: encode, persist and offer the result
pub struct MediaOperationExecutor {
    execute_port: Arc<dyn ExecutePort>,
    host: Arc<dyn InteractionHost>,
    settings: EncodeSettings,
    output_dir: PathBuf,
    renderers: RendererFactory,
}

impl MediaOperationExecutor {
    pub fn new(
        execute_port: Arc<dyn ExecutePort>,
        host: Arc<dyn InteractionHost>,
        settings: EncodeSettings,
        output_dir: impl Into<PathBuf>,
        progress: ProgressStyle,
    ) -> Self {
        Self {
            execute_port,
            host,
            settings,
            output_dir: output_dir.into(),
            renderers: Arc::new(move || progress.renderer()),
        }
    }

    /// Replace how progress is rendered
    pub fn with_renderers(mut self, renderers: RendererFactory) -> Self {
        self.renderers = renderers;
        self
    }

    /// Encode a composition into a new output artifact for `mode`
    pub async fn encode(
        &self,
        mode: OperationMode,
        composition: &Composition,
        disambiguator: &str,
    ) -> Result<OutputArtifact, DomainError> {
        let total_frames = composition.total_frames();
        let created_at = Local::now();
        let file_name = OutputNaming::file_name(mode.tag(), disambiguator, &created_at);
        let path = reserve_output_path(&self.output_dir, &file_name)?;

        info!(
            "{}: encoding {:.2}s ({} frames) to {} with {}/{}",
            mode.title(),
            composition.duration(),
            total_frames,
            path.display(),
            self.settings.video_codec,
            self.settings.audio_codec
        );

        let mut reporter = ProgressReporter::with_renderer(total_frames, (self.renderers)());
        if let Err(e) = self
            .execute_port
            .encode(composition, &self.settings, &path, &mut reporter)
            .await
        {
            warn!("Encoding failed; partial output may remain at {}", path.display());
            return Err(e);
        }
        reporter.finish();

        let byte_len = tokio::fs::metadata(&path).await?.len();
        let artifact = OutputArtifact {
            path,
            tag: mode.tag(),
            created_at,
            byte_len,
            duration: composition.duration(),
        };

        info!("{} ready: {}", mode.title(), artifact.path.display());
        self.host.offer_artifact(mode, &artifact);
        Ok(artifact)
    }
}
