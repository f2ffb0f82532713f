//! vedit CLI
//!
//! Session-based video editing from the command line.
//!
//! # Features
//!
//! - Merge an audio track into a video
//! - Trim a subclip with flexible time formats
//! - Concatenate videos in upload order
//! - Mix background music at chosen volumes
//! - Uploads stay staged per session until cleared
//!
//! # Usage
//!
//! ```bash
//! vedit merge --video clip.mp4 --audio voice.mp3
//! vedit trim --video clip.mp4 --start 00:05 --end 00:12.5
//! vedit concat --video a.mp4 --video b.mp4
//! vedit music --video clip.mp4 --audio song.mp3 --music-volume 0.3
//! vedit clear trim
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use vedit::adapters::console_host::{ConsoleHost, ViewFormat};
use vedit::adapters::tracing_log::TracingLogAdapter;
use vedit::app::DefaultAppContainer;
use vedit::cli::{commands, Cli, Commands};
use vedit::config_initialization::initialize_configuration_hierarchy;
use vedit::domain::errors::DomainError;

/// Main entry point for the vedit CLI application
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<DomainError>() {
            // Validation problems are the user's to fix; report them plainly
            Some(domain) if domain.is_validation() => {
                eprintln!("{}", domain);
                ExitCode::from(2)
            }
            _ => {
                error!("{:#}", e);
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = initialize_configuration_hierarchy(&cli)?;
    TracingLogAdapter::init(&config.log_level, config.log_format)?;

    info!("Starting vedit {} in session {}", cli.command.name(), cli.session);

    let host = Arc::new(ConsoleHost::new(ViewFormat::Text));
    let container = DefaultAppContainer::new(&config, host);
    let session = cli.session.clone();

    match cli.command {
        Commands::Merge(args) => commands::merge(&container, &session, args).await?,
        Commands::Trim(args) => commands::trim(&container, &session, args).await?,
        Commands::Concat(args) => commands::concat(&container, &session, args).await?,
        Commands::Music(args) => commands::music(&container, &session, args).await?,
        Commands::Clear(args) => commands::clear(&container, &session, args).await?,
        Commands::Status(args) => commands::status(&container, &session, args).await?,
        Commands::Export(args) => commands::export(&container, &session, args).await?,
        Commands::Inspect(args) => commands::inspect(&container, args).await?,
        Commands::Sessions => commands::sessions(&container).await?,
    }

    info!("vedit completed successfully");
    Ok(())
}
