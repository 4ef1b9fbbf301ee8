use tracing::{debug, trace};

use crate::bindings::{LifecycleRole, ModuleBindings};
use crate::error::{ScriptError, ScriptFault};
use crate::module_id::ModuleId;
use crate::runtime::{EntryPointHandle, ScriptRuntime};

/// Loads modules and binds lifecycle entry points through a [`ScriptRuntime`]
///
/// Converts the runtime's raw faults into typed [`ScriptError`]s.
pub struct SymbolResolver {
    runtime: Box<dyn ScriptRuntime>,
    strict: bool,
}

impl SymbolResolver {
    pub fn new(runtime: Box<dyn ScriptRuntime>) -> Self {
        Self {
            runtime,
            strict: false,
        }
    }

    /// Treat an entry point the root module does not define as an error
    pub fn with_strict_entry_points(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// (Re-)evaluate a module
    pub fn load(&mut self, module: &ModuleId) -> Result<(), ScriptError> {
        debug!(target: "hotplay", "Loading module {}", module);
        self.runtime
            .load_module(module)
            .map_err(|fault| ScriptError::Load {
                module: module.clone(),
                fault,
            })
    }

    /// Resolve a single symbol from a loaded module
    pub fn resolve(
        &mut self,
        module: &ModuleId,
        symbol: &str,
    ) -> Result<Option<EntryPointHandle>, ScriptError> {
        let handle = self
            .runtime
            .resolve_symbol(module, symbol)
            .map_err(|fault| ScriptError::SymbolResolution {
                module: module.clone(),
                symbol: symbol.to_string(),
                fault,
            })?;

        match handle {
            Some(handle) => Ok(Some(handle)),
            None if self.strict => Err(ScriptError::SymbolResolution {
                module: module.clone(),
                symbol: symbol.to_string(),
                fault: ScriptFault::new("entry point is not defined"),
            }),
            None => {
                trace!(target: "hotplay", "{} does not define {}", module, symbol);
                Ok(None)
            }
        }
    }

    /// Resolve all four lifecycle roles from `root` into a fresh binding set
    ///
    /// Nothing is returned unless every role resolved.
    pub fn bind(&mut self, root: &ModuleId) -> Result<ModuleBindings, ScriptError> {
        let mut bindings = ModuleBindings::empty();
        for role in LifecycleRole::ALL {
            let handle = self.resolve(root, role.symbol())?;
            bindings = bindings.with(role, handle);
        }
        Ok(bindings)
    }
}
