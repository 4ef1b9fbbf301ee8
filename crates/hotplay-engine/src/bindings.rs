use std::fmt;

use crate::error::ScriptError;
use crate::runtime::{EntryPointHandle, Invocation};

/// The four lifecycle roles a root module can export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleRole {
    Initialize,
    LoadContent,
    Update,
    Draw,
}

impl LifecycleRole {
    pub const ALL: [LifecycleRole; 4] = [
        LifecycleRole::Initialize,
        LifecycleRole::LoadContent,
        LifecycleRole::Update,
        LifecycleRole::Draw,
    ];

    /// Name of the function a script exports for this role
    pub fn symbol(&self) -> &'static str {
        match self {
            LifecycleRole::Initialize => "Initialize",
            LifecycleRole::LoadContent => "LoadContent",
            LifecycleRole::Update => "Update",
            LifecycleRole::Draw => "Draw",
        }
    }
}

impl fmt::Display for LifecycleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Entry points currently bound to the host lifecycle
///
/// A binding set is built completely before it is installed and is never
/// mutated afterwards; a reload replaces the whole value.
#[derive(Clone, Default)]
pub struct ModuleBindings {
    initialize: Option<EntryPointHandle>,
    load_content: Option<EntryPointHandle>,
    update: Option<EntryPointHandle>,
    draw: Option<EntryPointHandle>,
}

impl ModuleBindings {
    /// A binding set with nothing bound
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the handle for a role (used while building a new set)
    pub fn with(mut self, role: LifecycleRole, handle: Option<EntryPointHandle>) -> Self {
        *self.slot_mut(role) = handle;
        self
    }

    pub fn get(&self, role: LifecycleRole) -> Option<&EntryPointHandle> {
        match role {
            LifecycleRole::Initialize => self.initialize.as_ref(),
            LifecycleRole::LoadContent => self.load_content.as_ref(),
            LifecycleRole::Update => self.update.as_ref(),
            LifecycleRole::Draw => self.draw.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: LifecycleRole) -> &mut Option<EntryPointHandle> {
        match role {
            LifecycleRole::Initialize => &mut self.initialize,
            LifecycleRole::LoadContent => &mut self.load_content,
            LifecycleRole::Update => &mut self.update,
            LifecycleRole::Draw => &mut self.draw,
        }
    }

    /// Whether any role is bound
    pub fn is_empty(&self) -> bool {
        LifecycleRole::ALL.iter().all(|role| self.get(*role).is_none())
    }

    /// Call the entry point bound to `role`
    ///
    /// Returns `Ok(false)` when nothing is bound to the role.
    pub fn invoke(
        &self,
        role: LifecycleRole,
        invocation: Invocation<'_>,
    ) -> Result<bool, ScriptError> {
        let Some(handle) = self.get(role) else {
            return Ok(false);
        };

        handle
            .invoke(invocation)
            .map(|()| true)
            .map_err(|fault| ScriptError::Runtime { role, fault })
    }

    /// Symbol bound to each role, in lifecycle order
    pub fn symbols(&self) -> [(LifecycleRole, Option<&str>); 4] {
        LifecycleRole::ALL.map(|role| (role, self.get(role).map(|handle| handle.symbol())))
    }
}

impl fmt::Debug for ModuleBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (role, symbol) in self.symbols() {
            map.entry(&role, &symbol);
        }
        map.finish()
    }
}
