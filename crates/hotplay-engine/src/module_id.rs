use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Marker characters editors append to backup/swap copies of a file
const SWAP_MARKERS: &[char] = &['~'];

/// Logical name of a script module
///
/// A module id is the path of a script relative to the script root with the
/// extension stripped, always joined with `/`. `util/palette.rhai` and
/// `util\palette.rhai~` both map to `util/palette`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module id from an already-normalized logical name
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self(name.replace('\\', "/").trim_matches('/').to_string())
    }

    /// Build a module id from a path relative to the script root
    ///
    /// Returns `None` for paths that escape the root or have no file name.
    pub fn from_relative_path(relative: &Path) -> Option<Self> {
        let mut parts: Vec<String> = Vec::new();

        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }

        let file_name = parts.pop()?;
        let file_name = strip_swap_markers(&file_name);
        let stem = match file_name.rsplit_once('.') {
            // Dotfiles like `.hidden` keep their full name
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file_name,
        };

        if stem.is_empty() {
            return None;
        }

        parts.push(stem.to_string());
        Some(Self(parts.join("/")))
    }

    /// Build a module id from an absolute path inside `root`
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        Self::from_relative_path(relative)
    }

    /// The logical name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the module's source file below `root` for the given extension
    pub fn to_path(&self, root: &Path, extension: &str) -> PathBuf {
        let mut path = root.to_path_buf();
        let mut parts = self.0.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() && !extension.is_empty() {
                path.push(format!("{part}.{extension}"));
            } else {
                path.push(part);
            }
        }
        path
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Strip trailing swap-file markers (`game.rhai~` -> `game.rhai`)
pub fn strip_swap_markers(name: &str) -> &str {
    name.trim_end_matches(SWAP_MARKERS)
}
