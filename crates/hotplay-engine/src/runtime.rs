//! Capability interface over an embeddable scripting runtime
//!
//! The engine only needs two things from an interpreter: evaluate a module by
//! its logical name, and hand back a callable for a named function inside a
//! loaded module. Everything else (parsing, caching, sandboxing) belongs to
//! the runtime adapter.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::ScriptFault;
use crate::module_id::ModuleId;
use crate::render::Renderer;

/// Timing information for one tick of the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Frame counter, starting at 0
    pub frame: u64,
    /// Time since the previous frame
    pub elapsed: Duration,
    /// Time since the host loop started
    pub total: Duration,
}

impl FrameInfo {
    /// Advance to the next frame
    pub fn next(&self, elapsed: Duration) -> Self {
        Self {
            frame: self.frame + 1,
            elapsed,
            total: self.total + elapsed,
        }
    }
}

/// Arguments for one call into a lifecycle entry point
pub enum Invocation<'a> {
    Initialize,
    LoadContent,
    Update(&'a FrameInfo),
    Draw(&'a FrameInfo, &'a mut dyn Renderer),
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Initialize => f.write_str("Initialize"),
            Invocation::LoadContent => f.write_str("LoadContent"),
            Invocation::Update(frame) => f.debug_tuple("Update").field(frame).finish(),
            Invocation::Draw(frame, _) => f.debug_tuple("Draw").field(frame).finish(),
        }
    }
}

/// A callable resolved from a loaded module
pub trait EntryPoint {
    /// Name of the function this handle calls
    fn symbol(&self) -> &str;

    /// Call the function
    fn invoke(&self, invocation: Invocation<'_>) -> Result<(), ScriptFault>;
}

/// Shared handle to a resolved entry point
pub type EntryPointHandle = Rc<dyn EntryPoint>;

/// An embeddable interpreter the engine can load modules from
///
/// Implementations are only ever used from the frame thread and need not be
/// `Send`.
pub trait ScriptRuntime {
    /// (Re-)evaluate the module with the given logical name
    ///
    /// Must be safe to call repeatedly for the same module.
    fn load_module(&mut self, module: &ModuleId) -> Result<(), ScriptFault>;

    /// Resolve a callable named `symbol` inside `module`
    ///
    /// Returns `Ok(None)` when the module simply does not define the symbol.
    fn resolve_symbol(
        &mut self,
        module: &ModuleId,
        symbol: &str,
    ) -> Result<Option<EntryPointHandle>, ScriptFault>;
}
