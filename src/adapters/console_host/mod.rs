// Console host - Terminal front end standing in for the interactive UI

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::session::{ModeState, SessionContext};
use crate::ports::InteractionHost;
use crate::utils::format_file_size;

/// Format of a rendered session view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl FromStr for ViewFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ViewFormat::Text),
            "json" => Ok(ViewFormat::Json),
            "yaml" => Ok(ViewFormat::Yaml),
            _ => Err(DomainError::Validation(format!(
                "Unknown format: {}. Valid formats: text, json, yaml",
                s
            ))),
        }
    }
}

impl fmt::Display for ViewFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewFormat::Text => write!(f, "text"),
            ViewFormat::Json => write!(f, "json"),
            ViewFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// What the interface shows for one mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeView {
    pub mode: OperationMode,
    pub title: String,
    /// Source names of staged uploads, in slot order
    pub staged: Vec<String>,
    pub output: Option<String>,
}

/// What the interface shows for a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session: String,
    pub active_mode: Option<OperationMode>,
    pub modes: Vec<ModeView>,
}

impl SessionView {
    /// Derive the view from session state
    pub fn from_session(session: &SessionContext) -> Self {
        let modes = OperationMode::all()
            .iter()
            .filter_map(|mode| session.mode_state(*mode))
            .map(|state| {
                let mode = state.mode();
                let staged = match &state {
                    ModeState::Merge(s) => slot_names(&[&s.video, &s.audio]),
                    ModeState::Trim(s) => slot_names(&[&s.video]),
                    ModeState::Concat(s) => {
                        s.clips.iter().map(|clip| clip.file.source_name.clone()).collect()
                    }
                    ModeState::Music(s) => slot_names(&[&s.video, &s.audio]),
                };
                ModeView {
                    mode,
                    title: mode.title().to_string(),
                    staged,
                    output: state.output().map(|artifact| artifact.path.display().to_string()),
                }
            })
            .collect();

        Self {
            session: session.id.to_string(),
            active_mode: session.active_mode,
            modes,
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: ViewFormat) -> Result<String, DomainError> {
        match format {
            ViewFormat::Text => Ok(self.to_text()),
            ViewFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| DomainError::Session(format!("JSON rendering failed: {}", e))),
            ViewFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| DomainError::Session(format!("YAML rendering failed: {}", e))),
        }
    }

    fn to_text(&self) -> String {
        let mut lines = vec![format!("Session: {}", self.session)];
        if self.modes.is_empty() {
            lines.push("  (nothing staged)".to_string());
        }
        for mode in &self.modes {
            let marker = if Some(mode.mode) == self.active_mode { "*" } else { " " };
            lines.push(format!("{} {} [{}]", marker, mode.title, mode.mode));
            if mode.staged.is_empty() {
                lines.push("    staged: none".to_string());
            } else {
                lines.push(format!("    staged: {}", mode.staged.join(", ")));
            }
            if let Some(output) = &mode.output {
                lines.push(format!("    output: {}", output));
            }
        }
        lines.join("\n")
    }
}

fn slot_names(slots: &[&Option<StagedMedia>]) -> Vec<String> {
    slots
        .iter()
        .filter_map(|slot| slot.as_ref().map(|media| media.file.source_name.clone()))
        .collect()
}

/// Interaction host printing to the terminal.
///
/// The last rendered view is cached and reused while the session is unchanged.
pub struct ConsoleHost {
    format: ViewFormat,
    cache: Mutex<Option<(SessionView, String)>>,
}

impl ConsoleHost {
    pub fn new(format: ViewFormat) -> Self {
        Self {
            format,
            cache: Mutex::new(None),
        }
    }

    /// Rendered view of a session, from cache when nothing changed
    pub fn rendered(&self, session: &SessionContext) -> String {
        let view = SessionView::from_session(session);
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((cached_view, text)) = cache.as_ref() {
            if cached_view == &view {
                return text.clone();
            }
        }

        let text = view
            .render(self.format)
            .unwrap_or_else(|e| format!("Failed to render session: {}", e));
        *cache = Some((view, text.clone()));
        text
    }

    pub fn is_cached(&self) -> bool {
        self.cache.lock().map(|cache| cache.is_some()).unwrap_or(false)
    }
}

impl InteractionHost for ConsoleHost {
    fn invalidate_caches(&self) {
        debug!("Dropping cached session view");
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    fn request_redraw(&self, session: &SessionContext) {
        println!("{}", self.rendered(session));
    }

    fn offer_artifact(&self, mode: OperationMode, artifact: &OutputArtifact) {
        println!(
            "{} complete: {} ({}, {:.2}s)",
            mode.title(),
            artifact.path.display(),
            format_file_size(artifact.byte_len),
            artifact.duration
        );
    }
}
