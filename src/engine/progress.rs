//! Progress reporting between the encoding backend and the user interface
//!
//! The backend pushes `(label, current, total)` updates into a
//! [`ProgressSink`]. [`ProgressReporter`] turns them into [`ProgressFrame`]s
//! and hands each frame to a [`ProgressRenderer`].

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::ports::ProgressSink;

/// Width of the console bar in cells
const BAR_WIDTH: usize = 20;

/// One rendered progress update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressFrame {
    /// What the backend is working on
    pub label: String,
    /// Units completed so far
    pub current: u64,
    /// Units expected in total; 0 when unknown
    pub total: u64,
    /// Whole-number percentage, absent when the total is unknown
    pub percent: Option<u8>,
    /// Set on the final frame of an encode
    pub finished: bool,
}

impl ProgressFrame {
    /// Percentage to report, treating an unknown total as 0%
    pub fn reported_percent(&self) -> u8 {
        self.percent.unwrap_or(0)
    }
}

/// Whole-number percentage of `current` over `total`, floored and capped at 100
pub fn percent_of(current: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = (current as u128 * 100 / total as u128).min(100);
    Some(percent as u8)
}

/// Something that can display progress frames
pub trait ProgressRenderer: Send {
    fn render(&mut self, frame: &ProgressFrame);
}

impl<F> ProgressRenderer for F
where
    F: FnMut(&ProgressFrame) + Send,
{
    fn render(&mut self, frame: &ProgressFrame) {
        self(frame)
    }
}

/// Progress reporter for a single encode
pub struct ProgressReporter {
    expected_total: u64,
    last_percent: u8,
    last_label: String,
    frames_emitted: u64,
    renderer: Box<dyn ProgressRenderer>,
}

impl ProgressReporter {
    /// Create a reporter expecting `expected_total` units of work
    pub fn new(expected_total: u64, renderer: impl ProgressRenderer + 'static) -> Self {
        Self::with_renderer(expected_total, Box::new(renderer))
    }

    /// Create a reporter around an already boxed renderer
    pub fn with_renderer(expected_total: u64, renderer: Box<dyn ProgressRenderer>) -> Self {
        Self {
            expected_total,
            last_percent: 0,
            last_label: String::new(),
            frames_emitted: 0,
            renderer,
        }
    }

    /// Total the caller computed before encoding began
    pub fn expected_total(&self) -> u64 {
        self.expected_total
    }

    /// Highest percentage reported so far
    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }

    /// Number of frames handed to the renderer
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Report completion at 100%
    pub fn finish(&mut self) {
        self.last_percent = 100;
        let label = if self.last_label.is_empty() {
            "done".to_string()
        } else {
            self.last_label.clone()
        };
        let frame = ProgressFrame {
            label,
            current: self.expected_total,
            total: self.expected_total,
            percent: Some(100),
            finished: true,
        };
        self.emit(frame);
    }

    fn emit(&mut self, frame: ProgressFrame) {
        self.frames_emitted += 1;
        self.renderer.render(&frame);
    }
}

impl ProgressSink for ProgressReporter {
    fn on_progress(&mut self, label: &str, current: u64, total: u64) {
        // Percentages never go backwards, even if the backend revises its count
        let percent = percent_of(current, total).map(|percent| {
            let percent = percent.max(self.last_percent);
            self.last_percent = percent;
            percent
        });

        self.last_label = label.to_string();
        let frame = ProgressFrame {
            label: label.to_string(),
            current,
            total,
            percent,
            finished: false,
        };
        self.emit(frame);
    }
}

/// Text line for a frame: `[██████░░░░]  42% frame`, or `frame: 120` without a total
pub fn format_progress_line(frame: &ProgressFrame) -> String {
    match frame.percent {
        Some(percent) => {
            let filled = (percent as usize * BAR_WIDTH) / 100;
            let bar = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);
            format!("[{}] {:>3}% {}", bar, percent, frame.label)
        }
        None => format!("{}: {}", frame.label, frame.current),
    }
}

/// Console renderer drawing a bar on stderr
pub struct ConsoleRenderer {
    last_line: Option<String>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self { last_line: None }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressRenderer for ConsoleRenderer {
    fn render(&mut self, frame: &ProgressFrame) {
        let line = format_progress_line(frame);
        if self.last_line.as_deref() == Some(line.as_str()) && !frame.finished {
            return;
        }

        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{}", line);
        if frame.finished {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
        self.last_line = Some(line);
    }
}

/// JSON renderer emitting one event per line on stdout
pub struct JsonRenderer;

impl ProgressRenderer for JsonRenderer {
    fn render(&mut self, frame: &ProgressFrame) {
        let event = serde_json::json!({
            "event": if frame.finished { "complete" } else { "progress" },
            "label": frame.label,
            "current": frame.current,
            "total": frame.total,
            "percent": frame.percent,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }
}

/// Renderer for when progress display is disabled
pub struct SilentRenderer;

impl ProgressRenderer for SilentRenderer {
    fn render(&mut self, _frame: &ProgressFrame) {}
}

/// How progress is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStyle {
    #[default]
    Bar,
    Json,
    None,
}

impl ProgressStyle {
    /// Renderer drawing this style
    pub fn renderer(&self) -> Box<dyn ProgressRenderer> {
        match self {
            ProgressStyle::Bar => Box::new(ConsoleRenderer::new()),
            ProgressStyle::Json => Box::new(JsonRenderer),
            ProgressStyle::None => Box::new(SilentRenderer),
        }
    }
}

impl FromStr for ProgressStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ProgressStyle::Bar),
            "json" => Ok(ProgressStyle::Json),
            "none" | "off" => Ok(ProgressStyle::None),
            _ => Err(DomainError::Config(format!(
                "Unknown progress style: {}. Valid styles: bar, json, none",
                s
            ))),
        }
    }
}

impl fmt::Display for ProgressStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStyle::Bar => write!(f, "bar"),
            ProgressStyle::Json => write!(f, "json"),
            ProgressStyle::None => write!(f, "none"),
        }
    }
}
