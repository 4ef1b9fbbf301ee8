//! Script file change aggregation
//!
//! A `notify` watcher runs its callback on a background thread. The callback
//! only normalizes paths into [`ModuleId`]s and sends them down a channel;
//! the frame loop drains the channel once per tick into
//! [`PendingChanges`](crate::pending::PendingChanges). No reload work ever
//! happens on the watcher thread.

use std::fs;
use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode, MetadataKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::error::EngineError;
use crate::module_id::{strip_swap_markers, ModuleId};
use crate::pending::PendingChanges;

/// Message from the notification side to the frame loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    /// A script module changed on disk
    Module(ModuleId),
    /// Reload the whole script tree
    FullReload,
}

/// Sending half of the change channel
///
/// Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone)]
pub struct ChangeSender {
    tx: UnboundedSender<ChangeNotice>,
}

impl ChangeSender {
    /// Record that a module changed. Returns false once the engine is gone.
    pub fn module_changed(&self, module: ModuleId) -> bool {
        self.tx.send(ChangeNotice::Module(module)).is_ok()
    }

    /// Ask for a full reload on the next frame
    pub fn request_full_reload(&self) -> bool {
        self.tx.send(ChangeNotice::FullReload).is_ok()
    }
}

/// Receiving half of the change channel, owned by the frame loop
#[derive(Debug)]
pub struct ChangeFeed {
    rx: UnboundedReceiver<ChangeNotice>,
}

impl ChangeFeed {
    /// Move every queued notice into `pending` without blocking
    ///
    /// Returns the number of notices drained.
    pub fn drain_into(&mut self, pending: &mut PendingChanges) -> usize {
        let mut drained = 0;
        while let Ok(notice) = self.rx.try_recv() {
            pending.absorb(notice);
            drained += 1;
        }
        drained
    }
}

/// Create a connected sender/feed pair
pub fn change_channel() -> (ChangeSender, ChangeFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChangeSender { tx }, ChangeFeed { rx })
}

/// Decides which filesystem events name a script module
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: PathBuf,
    extensions: Vec<String>,
}

impl WatchFilter {
    /// `extensions` lists accepted file extensions; empty accepts everything
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether an event kind can represent a content change
    pub fn is_relevant(kind: &EventKind) -> bool {
        match kind {
            EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => true,
            EventKind::Modify(ModifyKind::Metadata(meta)) => {
                matches!(meta, MetadataKind::WriteTime | MetadataKind::Any)
            }
            EventKind::Modify(_) => true,
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
            EventKind::Access(_) | EventKind::Other => false,
        }
    }

    /// Normalize a single path, or `None` if it should be ignored
    ///
    /// Directories, paths that cannot be stat'ed (an editor's temp file that
    /// is already gone) and files with an unwatched extension are ignored.
    pub fn module_for(&self, path: &Path) -> Option<ModuleId> {
        let file_name = path.file_name()?.to_string_lossy();
        let path = path.with_file_name(strip_swap_markers(&file_name));

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                trace!(target: "hotplay", "Ignoring {}: {}", path.display(), e);
                return None;
            }
        };

        if metadata.is_dir() {
            return None;
        }

        if !self.extensions.is_empty() {
            let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
            if !self.extensions.iter().any(|accepted| accepted == extension) {
                return None;
            }
        }

        ModuleId::from_path(&self.root, &path)
    }

    /// All modules named by a notification
    pub fn modules_for_event(&self, event: &Event) -> Vec<ModuleId> {
        if !Self::is_relevant(&event.kind) {
            return Vec::new();
        }

        let mut modules: Vec<ModuleId> = event
            .paths
            .iter()
            .filter_map(|path| self.module_for(path))
            .collect();
        modules.dedup();
        modules
    }
}

/// Recursive filesystem watch on the script source directory
pub struct ChangeAggregator {
    watcher: RecommendedWatcher,
    root: PathBuf,
}

impl ChangeAggregator {
    /// Start watching `filter.root()` and forward module changes to `sender`
    pub fn start(filter: WatchFilter, sender: ChangeSender) -> Result<Self, EngineError> {
        let root = filter.root().to_path_buf();
        let watch_error = |source| EngineError::Watch {
            path: root.clone(),
            source,
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for module in filter.modules_for_event(&event) {
                        debug!(target: "hotplay", "Change detected: {} ({:?})", module, event.kind);
                        if !sender.module_changed(module) {
                            trace!(target: "hotplay", "Change feed closed, dropping notification");
                        }
                    }
                }
                Err(e) => warn!(target: "hotplay", "File watcher error: {}", e),
            }
        })
        .map_err(watch_error)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(watch_error)?;

        info!(target: "hotplay", "Watching for script changes in {}", root.display());

        Ok(Self { watcher, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Unsubscribe from the filesystem
    pub fn stop(mut self) {
        if let Err(e) = self.watcher.unwatch(&self.root) {
            debug!(target: "hotplay", "Failed to unwatch {}: {}", self.root.display(), e);
        }
        info!(target: "hotplay", "Stopped watching {}", self.root.display());
    }
}
