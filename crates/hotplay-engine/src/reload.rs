//! Turns pending module changes into a new set of lifecycle bindings

use std::fmt;

use tracing::{debug, info, warn};

use crate::bindings::{LifecycleRole, ModuleBindings};
use crate::error::ScriptError;
use crate::error_state::ErrorState;
use crate::layout::SourceLayout;
use crate::mirror;
use crate::module_id::ModuleId;
use crate::pending::PendingChanges;
use crate::resolver::SymbolResolver;
use crate::runtime::Invocation;

/// How much of the script tree a reload touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPlan {
    /// Regenerate the runtime directory and reload the root module
    Full,
    /// Reload only the modules that changed
    Incremental,
}

impl fmt::Display for ReloadPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadPlan::Full => f.write_str("full"),
            ReloadPlan::Incremental => f.write_str("incremental"),
        }
    }
}

/// Outcome of one reload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadReport {
    pub plan: ReloadPlan,
    /// Modules that evaluated successfully, in load order
    pub reloaded: Vec<ModuleId>,
    /// Modules that failed to evaluate
    pub failed: Vec<ModuleId>,
    /// Whether new bindings were installed and content loaded without error
    pub success: bool,
}

impl ReloadReport {
    fn new(plan: ReloadPlan) -> Self {
        Self {
            plan,
            reloaded: Vec::new(),
            failed: Vec::new(),
            success: false,
        }
    }
}

impl fmt::Display for ReloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reload {} ({} reloaded",
            self.plan,
            if self.success { "succeeded" } else { "failed" },
            self.reloaded.len()
        )?;
        if !self.failed.is_empty() {
            write!(f, ", {} failed", self.failed.len())?;
        }
        f.write_str(")")
    }
}

/// When a reload runs, which decides the entry points called afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReloadPhase {
    /// First load at startup: Initialize only, the host loads content itself
    Startup,
    /// Reload while running: LoadContent, preceded by Initialize if configured
    Live,
}

/// Owns the transition from pending changes to installed bindings
pub struct ReloadOrchestrator {
    resolver: SymbolResolver,
    layout: SourceLayout,
    root: ModuleId,
    reinitialize_on_reload: bool,
    bound_once: bool,
    last_attempt_failed: bool,
}

impl ReloadOrchestrator {
    pub fn new(resolver: SymbolResolver, layout: SourceLayout, root: ModuleId) -> Self {
        Self {
            resolver,
            layout,
            root,
            reinitialize_on_reload: false,
            bound_once: false,
            last_attempt_failed: false,
        }
    }

    /// Call Initialize again after every successful reload
    pub fn with_reinitialize_on_reload(mut self, reinitialize: bool) -> Self {
        self.reinitialize_on_reload = reinitialize;
        self
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    pub fn root(&self) -> &ModuleId {
        &self.root
    }

    /// The plan the next attempt would use
    pub fn plan_for(&self, pending: &PendingChanges) -> ReloadPlan {
        if !self.bound_once
            || self.last_attempt_failed
            || self.layout.mirroring_enabled()
            || pending.full_reload_requested()
        {
            ReloadPlan::Full
        } else {
            ReloadPlan::Incremental
        }
    }

    /// First full load at startup, followed by Initialize
    pub fn initial_load(
        &mut self,
        pending: &mut PendingChanges,
        bindings: &mut ModuleBindings,
        errors: &mut ErrorState,
    ) -> ReloadReport {
        self.attempt(ReloadPhase::Startup, pending, bindings, errors)
    }

    /// Run one reload attempt while the game is running
    ///
    /// Any failure is captured into `errors`. `bindings` is only replaced
    /// when every entry point resolved.
    pub fn attempt_reload(
        &mut self,
        pending: &mut PendingChanges,
        bindings: &mut ModuleBindings,
        errors: &mut ErrorState,
    ) -> ReloadReport {
        self.attempt(ReloadPhase::Live, pending, bindings, errors)
    }

    fn attempt(
        &mut self,
        phase: ReloadPhase,
        pending: &mut PendingChanges,
        bindings: &mut ModuleBindings,
        errors: &mut ErrorState,
    ) -> ReloadReport {
        errors.clear();

        let plan = self.plan_for(pending);
        let batch = pending.begin_attempt();
        let mut report = ReloadReport::new(plan);
        debug!(target: "hotplay", "Starting {} reload of {} module(s)", plan, batch.len());

        let result = self.run(plan, phase, &batch, pending, bindings, &mut report);
        if let Err(err) = result {
            errors.capture(err);
        }

        report.success = !errors.is_frozen();
        self.last_attempt_failed = !report.success;

        if report.success {
            info!(target: "hotplay", "{}", report);
        } else {
            warn!(target: "hotplay", "{}", report);
        }
        report
    }

    fn run(
        &mut self,
        plan: ReloadPlan,
        phase: ReloadPhase,
        batch: &[ModuleId],
        pending: &mut PendingChanges,
        bindings: &mut ModuleBindings,
        report: &mut ReloadReport,
    ) -> Result<(), ScriptError> {
        if plan == ReloadPlan::Full {
            let regenerated =
                mirror::regenerate(self.layout.source_dir(), self.layout.runtime_dir());
            if let Err(err) = regenerated {
                for module in batch {
                    pending.complete(module, false);
                }
                return Err(err.into());
            }
        }

        let mut order: Vec<&ModuleId> = batch
            .iter()
            .filter(|module| **module != self.root)
            .collect();
        if plan == ReloadPlan::Full || batch.contains(&self.root) {
            order.push(&self.root);
        }

        let mut first_failure = None;
        for module in order {
            let loaded = self.resolver.load(module);
            pending.complete(module, loaded.is_ok());
            match loaded {
                Ok(()) => report.reloaded.push(module.clone()),
                Err(err) => {
                    debug!(target: "hotplay", "Module {} failed to load", module);
                    report.failed.push(module.clone());
                    first_failure.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_failure {
            return Err(err);
        }

        // Keep the previous bindings if resolution fails
        let fresh = self.resolver.bind(&self.root)?;
        debug!(target: "hotplay", "Bound entry points: {:?}", fresh);
        *bindings = fresh;
        let first_binding = !self.bound_once;
        self.bound_once = true;

        match phase {
            ReloadPhase::Startup => {
                bindings.invoke(LifecycleRole::Initialize, Invocation::Initialize)?;
            }
            ReloadPhase::Live => {
                // A game whose startup failed has never been initialized
                if self.reinitialize_on_reload || first_binding {
                    bindings.invoke(LifecycleRole::Initialize, Invocation::Initialize)?;
                }
                bindings.invoke(LifecycleRole::LoadContent, Invocation::LoadContent)?;
            }
        }
        Ok(())
    }
}
