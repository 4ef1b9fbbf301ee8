//! Live hot-reload engine for script-driven game loops
//!
//! A host drives [`LiveEngine`] through the usual lifecycle (`init`,
//! `load_content`, then `update`/`draw` every frame). The game logic lives in
//! script modules loaded through a [`ScriptRuntime`]; when their files change
//! on disk the engine reloads them between frames and rebinds the
//! `Initialize`, `LoadContent`, `Update` and `Draw` entry points. A failing
//! script freezes gameplay and replaces the frame with a diagnostic until the
//! next successful reload.
//!
//! [`RhaiRuntime`](crate::rhai::RhaiRuntime) is the bundled runtime.

pub mod bindings;
pub mod config;
pub mod engine;
pub mod error;
pub mod error_state;
pub mod layout;
pub mod mirror;
pub mod module_id;
pub mod pending;
pub mod reload;
pub mod render;
pub mod resolver;
pub mod rhai;
pub mod runtime;
pub mod watch;

pub use bindings::{LifecycleRole, ModuleBindings};
pub use config::{ConfigLoadError, DisplayConfig, HotplayConfig, ScriptsConfig, MARKER_FILE};
pub use engine::{DrawOutcome, LiveEngine, UpdateOutcome};
pub use error::{EngineError, ScriptError, ScriptFault};
pub use error_state::{DiagnosticScreen, EngineState, ErrorState};
pub use layout::{LayoutError, SourceLayout};
pub use mirror::MirrorError;
pub use module_id::ModuleId;
pub use pending::PendingChanges;
pub use reload::{ReloadOrchestrator, ReloadPlan, ReloadReport};
pub use render::{Color, Position, RenderError, Renderer};
pub use resolver::SymbolResolver;
pub use runtime::{EntryPoint, EntryPointHandle, FrameInfo, Invocation, ScriptRuntime};
pub use watch::{ChangeAggregator, ChangeFeed, ChangeNotice, ChangeSender, WatchFilter};
