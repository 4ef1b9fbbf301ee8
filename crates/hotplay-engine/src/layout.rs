//! Project directory discovery

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{HotplayConfig, ScriptsConfig, MARKER_FILE};

/// Upper bound on parent directories visited while looking for the marker
pub const MAX_SEARCH_DEPTH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error(
        "no {} found in {} or its {} parent directories",
        MARKER_FILE,
        start.display(),
        MAX_SEARCH_DEPTH
    )]
    MarkerNotFound { start: PathBuf },

    #[error("cannot resolve {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Where a project's scripts live
///
/// Computed once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    root: PathBuf,
    source_dir: PathBuf,
    runtime_dir: PathBuf,
}

impl SourceLayout {
    /// Build a layout for a known project root
    pub fn new(root: impl Into<PathBuf>, scripts: &ScriptsConfig) -> Self {
        let root = root.into();
        let source_dir = root.join(&scripts.dir);
        let runtime_dir = match &scripts.runtime_dir {
            Some(dir) => root.join(dir),
            None => source_dir.clone(),
        };

        Self {
            root,
            source_dir,
            runtime_dir,
        }
    }

    /// Find the nearest project root at or above `start`
    pub fn find_root(start: &Path) -> Result<PathBuf, LayoutError> {
        let start = start.canonicalize().map_err(|source| LayoutError::Io {
            path: start.to_path_buf(),
            source,
        })?;

        let mut dir: &Path = &start;
        for _ in 0..MAX_SEARCH_DEPTH {
            if dir.join(MARKER_FILE).is_file() {
                debug!(target: "hotplay", "Found project root {}", dir.display());
                return Ok(dir.to_path_buf());
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }

        Err(LayoutError::MarkerNotFound { start })
    }

    /// Find the project root above `start` and read its config
    pub fn discover(start: &Path) -> Result<(Self, HotplayConfig), LayoutError> {
        let root = Self::find_root(start)?;
        let marker = root.join(MARKER_FILE);
        let config = HotplayConfig::load(&marker).map_err(|e| LayoutError::Config {
            path: marker,
            message: e.to_string(),
        })?;

        Ok((Self::new(root, &config.scripts), config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Authoritative script sources, watched for changes
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory the scripting runtime reads from
    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    /// Whether the runtime reads a copy of the sources
    pub fn mirroring_enabled(&self) -> bool {
        self.source_dir != self.runtime_dir
    }
}
