use std::time::Duration;

use hotplay_engine::{DrawOutcome, EngineState, FrameInfo, LiveEngine, UpdateOutcome};
use tracing::info;

/// Host state for one running game
pub struct App {
    pub engine: LiveEngine,
    pub canvas: crate::canvas::TerminalCanvas,
    pub frame: FrameInfo,
    pub last_update: Option<UpdateOutcome>,
    pub last_draw: Option<DrawOutcome>,
    pub should_quit: bool,
}

impl App {
    pub fn new(engine: LiveEngine, width: u16, height: u16) -> Self {
        Self {
            engine,
            canvas: crate::canvas::TerminalCanvas::new(width, height),
            frame: FrameInfo::default(),
            last_update: None,
            last_draw: None,
            should_quit: false,
        }
    }

    /// Run the script's Initialize and LoadContent
    pub fn start(&mut self) -> EngineState {
        self.engine.init();
        self.engine.load_content()
    }

    /// Advance one frame: update, then draw into the canvas
    pub fn tick(&mut self, elapsed: Duration) {
        self.frame = self.frame.next(elapsed);
        self.last_update = Some(self.engine.update(&self.frame));
        self.last_draw = Some(self.engine.draw(&self.frame, &mut self.canvas));
    }

    /// Queue a full reload for the next frame
    pub fn request_reload(&self) {
        info!("Full reload requested");
        self.engine.request_reload();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.canvas.resize(width, height);
    }

    /// One-line summary for the status bar
    pub fn status_line(&self) -> String {
        let state = match self.engine.state() {
            EngineState::Running => "running",
            EngineState::ErrorFrozen => "frozen",
        };
        let watching = if self.engine.is_watching() {
            "watching"
        } else {
            "manual reload"
        };

        let mut status = format!("frame {} | {} | {}", self.frame.frame, state, watching);
        if let Some(report) = self.engine.last_report() {
            status.push_str(&format!(" | {}", report));
        }
        status
    }

    pub fn is_frozen(&self) -> bool {
        self.engine.state() == EngineState::ErrorFrozen
    }
}
