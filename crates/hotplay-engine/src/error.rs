use std::fmt;
use std::path::PathBuf;

use crate::bindings::LifecycleRole;
use crate::layout::LayoutError;
use crate::mirror::MirrorError;
use crate::module_id::ModuleId;

/// Raw diagnostic reported by a scripting runtime
///
/// `message` is the runtime's own description of the failure, `cause` the
/// nested error it wraps (if any), e.g. the exception thrown inside a
/// function that failed to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFault {
    pub message: String,
    pub cause: Option<String>,
}

impl ScriptFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for ScriptFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ScriptFault {}

/// Every failure the engine can capture into its error state
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A module failed to evaluate
    #[error("failed to load module `{module}`: {fault}")]
    Load { module: ModuleId, fault: ScriptFault },

    /// An entry point could not be resolved from a loaded module
    #[error("failed to resolve `{symbol}` in module `{module}`: {fault}")]
    SymbolResolution {
        module: ModuleId,
        symbol: String,
        fault: ScriptFault,
    },

    /// Copying the script tree into the runtime directory failed
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// A bound entry point failed while running
    #[error("{role} failed: {fault}")]
    Runtime {
        role: LifecycleRole,
        fault: ScriptFault,
    },
}

impl ScriptError {
    /// The nested cause of this failure, if one was reported
    pub fn cause(&self) -> Option<String> {
        match self {
            ScriptError::Load { fault, .. }
            | ScriptError::SymbolResolution { fault, .. }
            | ScriptError::Runtime { fault, .. } => fault.cause.clone(),
            ScriptError::Mirror(err) => {
                std::error::Error::source(err).map(|source| source.to_string())
            }
        }
    }

    /// Full text shown on the error screen: the failure followed by its cause
    pub fn diagnostic_text(&self) -> String {
        match self.cause() {
            Some(cause) => format!("{self}\ncaused by: {cause}"),
            None => self.to_string(),
        }
    }
}

/// Errors that prevent the engine from starting at all
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
