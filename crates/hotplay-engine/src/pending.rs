use std::collections::BTreeSet;

use crate::module_id::ModuleId;
use crate::watch::ChangeNotice;

/// Modules waiting to be reloaded
///
/// Lives on the frame thread. Inserting is idempotent, so a module changed
/// several times between two frames is reloaded once. Modules whose last
/// reload failed are parked in a carry-over set: they do not request a reload
/// on their own but join the next attempt.
#[derive(Debug, Default, Clone)]
pub struct PendingChanges {
    modules: BTreeSet<ModuleId>,
    carried: BTreeSet<ModuleId>,
    full_reload: bool,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a notice from the change feed
    pub fn absorb(&mut self, notice: ChangeNotice) {
        match notice {
            ChangeNotice::Module(module) => {
                self.insert(module);
            }
            ChangeNotice::FullReload => self.full_reload = true,
        }
    }

    /// Queue a module. Returns false if it was already queued.
    pub fn insert(&mut self, module: ModuleId) -> bool {
        self.modules.insert(module)
    }

    /// Whether the next frame should run a reload
    pub fn reload_requested(&self) -> bool {
        self.full_reload || !self.modules.is_empty()
    }

    /// Whether a full reload was explicitly requested
    pub fn full_reload_requested(&self) -> bool {
        self.full_reload
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.modules.contains(module)
    }

    /// Modules carried over from a failed attempt
    pub fn carried(&self) -> impl Iterator<Item = &ModuleId> {
        self.carried.iter()
    }

    /// Start a reload attempt: fold carried modules back in, clear the full
    /// reload flag and return the modules to process, in order
    pub(crate) fn begin_attempt(&mut self) -> Vec<ModuleId> {
        self.modules.append(&mut self.carried);
        self.full_reload = false;
        self.modules.iter().cloned().collect()
    }

    /// The attempt for `module` finished (successfully or not)
    pub(crate) fn complete(&mut self, module: &ModuleId, succeeded: bool) {
        if self.modules.remove(module) && !succeeded {
            self.carried.insert(module.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut pending = PendingChanges::new();
        assert!(pending.insert(ModuleId::new("game")));
        assert!(!pending.insert(ModuleId::new("game")));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_full_reload_notice_requests_reload() {
        let mut pending = PendingChanges::new();
        assert!(!pending.reload_requested());

        pending.absorb(ChangeNotice::FullReload);
        assert!(pending.reload_requested());
        assert!(pending.full_reload_requested());
        assert!(pending.is_empty());
    }

    #[test]
    fn test_failed_module_is_carried_not_requested() {
        let mut pending = PendingChanges::new();
        pending.insert(ModuleId::new("enemies/bat"));
        pending.insert(ModuleId::new("game"));

        let batch = pending.begin_attempt();
        assert_eq!(batch, vec![ModuleId::new("enemies/bat"), ModuleId::new("game")]);

        pending.complete(&ModuleId::new("enemies/bat"), false);
        pending.complete(&ModuleId::new("game"), true);

        // The failing module alone does not trigger another reload
        assert!(!pending.reload_requested());
        assert_eq!(
            pending.carried().cloned().collect::<Vec<_>>(),
            vec![ModuleId::new("enemies/bat")]
        );

        // But it joins the next attempt
        pending.insert(ModuleId::new("game"));
        let batch = pending.begin_attempt();
        assert_eq!(batch, vec![ModuleId::new("enemies/bat"), ModuleId::new("game")]);
        assert_eq!(pending.carried().count(), 0);
    }

    #[test]
    fn test_changes_during_attempt_survive() {
        let mut pending = PendingChanges::new();
        pending.insert(ModuleId::new("game"));

        let batch = pending.begin_attempt();
        // Another module changes before the attempt completes
        pending.insert(ModuleId::new("hud"));
        for module in &batch {
            pending.complete(module, true);
        }

        assert!(pending.contains(&ModuleId::new("hud")));
        assert!(pending.reload_requested());
    }
}
