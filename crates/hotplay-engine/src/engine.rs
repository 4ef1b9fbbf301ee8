//! The per-frame entry point a host drives

use tracing::{debug, info, warn};

use crate::bindings::{LifecycleRole, ModuleBindings};
use crate::config::HotplayConfig;
use crate::error::{EngineError, ScriptError};
use crate::error_state::{DiagnosticScreen, EngineState, ErrorState};
use crate::layout::SourceLayout;
use crate::pending::PendingChanges;
use crate::reload::{ReloadOrchestrator, ReloadReport};
use crate::render::Renderer;
use crate::resolver::SymbolResolver;
use crate::runtime::{FrameInfo, Invocation, ScriptRuntime};
use crate::watch::{change_channel, ChangeAggregator, ChangeFeed, ChangeSender, WatchFilter};

/// What [`LiveEngine::update`] did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A reload ran instead of the script's Update
    Reloaded,
    /// A failure is captured; Update was skipped
    Frozen,
    /// The script's Update ran
    Forwarded,
    /// The root module does not define Update
    Unbound,
    /// The script's Update failed and the engine is now frozen
    Failed,
}

/// What [`LiveEngine::draw`] did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The error screen was drawn instead of the script's Draw
    Diagnostic,
    Forwarded,
    Unbound,
    Failed,
}

/// Hosts a script-driven game loop and keeps it live-reloadable
///
/// All methods run on the frame thread. The only state shared with another
/// thread is the change channel fed by the file watcher.
pub struct LiveEngine {
    orchestrator: ReloadOrchestrator,
    bindings: ModuleBindings,
    errors: ErrorState,
    pending: PendingChanges,
    feed: ChangeFeed,
    sender: ChangeSender,
    watcher: Option<ChangeAggregator>,
    screen: DiagnosticScreen,
    last_report: Option<ReloadReport>,
}

impl LiveEngine {
    /// Create an engine for a project, starting the file watcher unless
    /// the config disables it
    pub fn new(
        layout: SourceLayout,
        config: &HotplayConfig,
        runtime: Box<dyn ScriptRuntime>,
    ) -> Result<Self, EngineError> {
        let scripts = &config.scripts;
        let (sender, feed) = change_channel();

        let watcher = if scripts.watch {
            let filter = WatchFilter::new(layout.source_dir(), scripts.watch_extensions.clone());
            Some(ChangeAggregator::start(filter, sender.clone())?)
        } else {
            info!(target: "hotplay", "File watching disabled; reload on request only");
            None
        };

        let resolver =
            SymbolResolver::new(runtime).with_strict_entry_points(scripts.strict_entry_points);
        let orchestrator = ReloadOrchestrator::new(resolver, layout, scripts.root_module_id())
            .with_reinitialize_on_reload(scripts.reinitialize_on_reload);

        Ok(Self {
            orchestrator,
            bindings: ModuleBindings::empty(),
            errors: ErrorState::new(),
            pending: PendingChanges::new(),
            feed,
            sender,
            watcher,
            screen: DiagnosticScreen::new(&config.display.error_font, config.display.wrap_width),
            last_report: None,
        })
    }

    /// Load the root module, bind its entry points and call Initialize
    pub fn init(&mut self) -> EngineState {
        debug!(target: "hotplay", "Initializing from {}", self.layout().runtime_dir().display());
        let report = self.orchestrator.initial_load(
            &mut self.pending,
            &mut self.bindings,
            &mut self.errors,
        );
        self.finish_reload(report);
        self.state()
    }

    /// Call the script's LoadContent
    pub fn load_content(&mut self) -> EngineState {
        let result = self
            .bindings
            .invoke(LifecycleRole::LoadContent, Invocation::LoadContent);
        self.settle(result);
        self.state()
    }

    /// Run one tick: reload if changes are pending, otherwise forward to
    /// the script's Update unless frozen
    pub fn update(&mut self, frame: &FrameInfo) -> UpdateOutcome {
        let drained = self.feed.drain_into(&mut self.pending);
        if drained > 0 {
            debug!(target: "hotplay", "Drained {} change notice(s)", drained);
        }

        if self.pending.reload_requested() {
            let report = self.orchestrator.attempt_reload(
                &mut self.pending,
                &mut self.bindings,
                &mut self.errors,
            );
            self.finish_reload(report);
            return UpdateOutcome::Reloaded;
        }

        if self.errors.is_frozen() {
            return UpdateOutcome::Frozen;
        }

        let result = self
            .bindings
            .invoke(LifecycleRole::Update, Invocation::Update(frame));
        match self.settle(result) {
            Some(true) => UpdateOutcome::Forwarded,
            Some(false) => UpdateOutcome::Unbound,
            None => UpdateOutcome::Failed,
        }
    }

    /// Draw one frame: the error screen while frozen, otherwise the
    /// script's Draw
    pub fn draw(&mut self, frame: &FrameInfo, renderer: &mut dyn Renderer) -> DrawOutcome {
        if self.errors.is_frozen() {
            let lines = self.errors.diagnostic_lines(self.screen.wrap_width);
            if let Err(e) = self.screen.render(renderer, &lines) {
                warn!(target: "hotplay", "Failed to draw error screen: {}", e);
            }
            return DrawOutcome::Diagnostic;
        }

        let result = self
            .bindings
            .invoke(LifecycleRole::Draw, Invocation::Draw(frame, renderer));
        match self.settle(result) {
            Some(true) => DrawOutcome::Forwarded,
            Some(false) => DrawOutcome::Unbound,
            None => DrawOutcome::Failed,
        }
    }

    /// Stop watching the filesystem
    pub fn shutdown(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
    }

    /// Queue a full reload for the next frame
    pub fn request_reload(&self) {
        self.sender.request_full_reload();
    }

    pub fn state(&self) -> EngineState {
        self.errors.state()
    }

    pub fn error(&self) -> Option<&ScriptError> {
        self.errors.failure()
    }

    /// The error screen text, already wrapped
    pub fn diagnostic_lines(&self) -> Vec<String> {
        self.errors.diagnostic_lines(self.screen.wrap_width)
    }

    pub fn bindings(&self) -> &ModuleBindings {
        &self.bindings
    }

    pub fn layout(&self) -> &SourceLayout {
        self.orchestrator.layout()
    }

    /// A handle that can queue changes from any thread
    pub fn change_sender(&self) -> ChangeSender {
        self.sender.clone()
    }

    pub fn last_report(&self) -> Option<&ReloadReport> {
        self.last_report.as_ref()
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    fn finish_reload(&mut self, report: ReloadReport) {
        self.errors.report();
        self.last_report = Some(report);
    }

    /// Capture a failed call and log it. Returns whether an entry point ran,
    /// or `None` if it failed.
    fn settle(&mut self, result: Result<bool, ScriptError>) -> Option<bool> {
        let ran = match result {
            Ok(ran) => Some(ran),
            Err(err) => {
                self.errors.capture(err);
                None
            }
        };
        self.errors.report();
        ran
    }
}

impl Drop for LiveEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
