//! Frozen-on-failure state and the diagnostic screen

use tracing::{error, warn};

use crate::error::ScriptError;
use crate::render::{Color, Position, RenderError, Renderer};

/// Whether gameplay is running or frozen on a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    ErrorFrozen,
}

/// The most recent captured failure
///
/// A failure stays captured until the next reload attempt clears it.
#[derive(Debug, Default)]
pub struct ErrorState {
    failure: Option<ScriptError>,
    surfaced: bool,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze on `err`, replacing any earlier failure
    pub fn capture(&mut self, err: ScriptError) {
        self.failure = Some(err);
        self.surfaced = false;
    }

    /// Forget the current failure
    pub fn clear(&mut self) {
        self.failure = None;
        self.surfaced = false;
    }

    pub fn state(&self) -> EngineState {
        if self.failure.is_some() {
            EngineState::ErrorFrozen
        } else {
            EngineState::Running
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&ScriptError> {
        self.failure.as_ref()
    }

    /// Returns the failure the first time it is asked for, then `None`
    /// until a new failure is captured
    pub fn surface_once(&mut self) -> Option<&ScriptError> {
        if self.surfaced {
            return None;
        }
        self.surfaced = true;
        self.failure.as_ref()
    }

    /// Log a newly captured failure
    pub fn report(&mut self) {
        if let Some(err) = self.surface_once() {
            error!(target: "hotplay", "{}", err.diagnostic_text());
        }
    }

    /// The diagnostic split into lines of at most `width` columns
    pub fn diagnostic_lines(&self, width: usize) -> Vec<String> {
        match &self.failure {
            Some(err) => wrap_diagnostic(&err.diagnostic_text(), width),
            None => Vec::new(),
        }
    }
}

/// Word-wrap diagnostic text, keeping its own line breaks
pub fn wrap_diagnostic(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Draws the error screen in place of the script's frame
#[derive(Debug, Clone)]
pub struct DiagnosticScreen {
    pub font: String,
    pub wrap_width: usize,
    pub background: Color,
    pub foreground: Color,
}

impl DiagnosticScreen {
    pub fn new(font: impl Into<String>, wrap_width: usize) -> Self {
        Self {
            font: font.into(),
            wrap_width,
            background: Color::BLACK,
            foreground: Color::WHITE,
        }
    }

    /// Render `lines`, closing a drawing session a failed script left open
    pub fn render(&self, renderer: &mut dyn Renderer, lines: &[String]) -> Result<(), RenderError> {
        if renderer.is_drawing() {
            if let Err(e) = renderer.end() {
                warn!(target: "hotplay", "Failed to close open draw session: {}", e);
            }
        }

        renderer.clear(self.background);
        renderer.begin()?;
        let text = lines.join("\n");
        let drawn = renderer.draw_text(&self.font, &text, Position::ZERO, self.foreground);
        let ended = renderer.end();
        drawn.and(ended)
    }
}
