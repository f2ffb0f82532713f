//! Command implementations
//!
//! Operation commands follow the same round: load the session, stage the
//! uploads, save, run the operation, save again. Saving before the run keeps
//! staged uploads even when the operation fails.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::console_host::SessionView;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::uploads::ReceiveReport;
use crate::app::workspace::SessionWorkspace;
use crate::cli::args::*;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::utils::time::parse_time;

/// Read a file from disk as an upload of the given kind
pub async fn read_upload(path: &Path, kind: MediaKind) -> Result<Upload> {
    if !path.is_file() {
        return Err(DomainError::MissingUpload(format!(
            "Input file does not exist: {}",
            path.display()
        ))
        .into());
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid input file path: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(Upload::new(name, kind, bytes))
}

async fn read_optional(path: Option<&Path>, kind: MediaKind) -> Result<Option<Upload>> {
    match path {
        Some(path) => Ok(Some(read_upload(path, kind).await?)),
        None => Ok(None),
    }
}

/// Save the session after staging, then surface any staging error
async fn settle_receive(
    container: &DefaultAppContainer,
    workspace: &SessionWorkspace,
    received: Result<ReceiveReport, DomainError>,
) -> Result<()> {
    container
        .save_workspace(workspace)
        .await
        .context("Failed to save session")?;
    let report = received?;
    info!(
        "Staged {} upload(s), reused {}, replaced {}",
        report.staged, report.reused, report.retired
    );
    Ok(())
}

/// Save the session after the operation, then surface any operation error
async fn settle_execute(
    container: &DefaultAppContainer,
    workspace: &SessionWorkspace,
    result: Result<OutputArtifact, DomainError>,
) -> Result<OutputArtifact> {
    container
        .save_workspace(workspace)
        .await
        .context("Failed to save session")?;
    Ok(result?)
}

/// Execute the merge command
pub async fn merge(container: &DefaultAppContainer, session: &SessionId, args: MergeArgs) -> Result<()> {
    let video = read_optional(args.video.as_deref(), MediaKind::Video).await?;
    let audio = read_optional(args.audio.as_deref(), MediaKind::Audio).await?;

    let interactor = container.merge_interactor();
    let mut workspace = container.open_workspace(session).await?;

    let received = interactor
        .receive(&mut workspace, video.as_ref(), audio.as_ref())
        .await;
    settle_receive(container, &workspace, received).await?;

    let result = interactor.execute(&mut workspace).await;
    let artifact = settle_execute(container, &workspace, result).await?;
    info!("Merge operation completed: {}", artifact.file_name());
    Ok(())
}

/// Execute the trim command
pub async fn trim(container: &DefaultAppContainer, session: &SessionId, args: TrimArgs) -> Result<()> {
    let video = read_optional(args.video.as_deref(), MediaKind::Video).await?;

    let interactor = container.trim_interactor();
    let mut workspace = container.open_workspace(session).await?;

    let received = interactor.receive(&mut workspace, video.as_ref()).await;
    settle_receive(container, &workspace, received).await?;

    let start = parse_optional_time(args.start.as_deref())?;
    let end = parse_optional_time(args.end.as_deref())?;

    let result = interactor.execute(&mut workspace, start, end).await;
    let artifact = settle_execute(container, &workspace, result).await?;
    info!("Trim operation completed: {}", artifact.file_name());
    Ok(())
}

fn parse_optional_time(raw: Option<&str>) -> Result<Option<f64>> {
    match raw {
        Some(raw) => {
            let seconds = parse_time(raw)
                .map_err(|e| DomainError::Validation(e.to_string()))?;
            Ok(Some(seconds))
        }
        None => Ok(None),
    }
}

/// Execute the concat command
pub async fn concat(container: &DefaultAppContainer, session: &SessionId, args: ConcatArgs) -> Result<()> {
    let mut videos = Vec::with_capacity(args.videos.len());
    for path in &args.videos {
        videos.push(read_upload(path, MediaKind::Video).await?);
    }

    let interactor = container.concat_interactor();
    let mut workspace = container.open_workspace(session).await?;

    let received = interactor.receive(&mut workspace, &videos).await;
    settle_receive(container, &workspace, received).await?;

    let result = interactor.execute(&mut workspace).await;
    let artifact = settle_execute(container, &workspace, result).await?;
    info!("Concat operation completed: {}", artifact.file_name());
    Ok(())
}

/// Execute the music command
pub async fn music(container: &DefaultAppContainer, session: &SessionId, args: MusicArgs) -> Result<()> {
    let video = read_optional(args.video.as_deref(), MediaKind::Video).await?;
    let audio = read_optional(args.audio.as_deref(), MediaKind::Audio).await?;

    let interactor = container.music_interactor();
    let mut workspace = container.open_workspace(session).await?;

    let received = interactor
        .receive(&mut workspace, video.as_ref(), audio.as_ref())
        .await;
    settle_receive(container, &workspace, received).await?;

    let result = interactor
        .execute(&mut workspace, args.original_volume, args.music_volume)
        .await;
    let artifact = settle_execute(container, &workspace, result).await?;
    info!("Background music operation completed: {}", artifact.file_name());
    Ok(())
}

/// Execute the clear command
pub async fn clear(container: &DefaultAppContainer, session: &SessionId, args: ClearArgs) -> Result<()> {
    let mut workspace = container.open_workspace(session).await?;
    let report = container.clear(&mut workspace, args.mode);
    container
        .save_workspace(&workspace)
        .await
        .context("Failed to save session")?;

    println!("Cleared {}: {}", args.mode.title(), report);
    Ok(())
}

/// Execute the status command
pub async fn status(container: &DefaultAppContainer, session: &SessionId, args: StatusArgs) -> Result<()> {
    let workspace = container.open_workspace(session).await?;
    let view = SessionView::from_session(&workspace.context);
    println!("{}", view.render(args.format)?);
    Ok(())
}

/// Execute the export command
pub async fn export(container: &DefaultAppContainer, session: &SessionId, args: ExportArgs) -> Result<()> {
    let workspace = container.open_workspace(session).await?;
    let target = container.export(&workspace, args.mode, &args.to).await?;
    println!("{}", target.display());
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(container: &DefaultAppContainer, args: InspectArgs) -> Result<()> {
    info!("Inspecting {}", args.input.display());
    let report = container.inspect_interactor().execute(&args.input).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize media info to JSON")?;
        println!("{}", json);
    } else {
        println!("{}", report.to_text());
    }
    Ok(())
}

/// Execute the sessions command
pub async fn sessions(container: &DefaultAppContainer) -> Result<()> {
    let sessions = container.sessions().await?;
    if sessions.is_empty() {
        println!("No saved sessions");
    }
    for id in sessions {
        println!("{}", id);
    }
    Ok(())
}
