use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::module_id::ModuleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// Script source directory, relative to the project root (default: game)
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Module exporting the lifecycle entry points (default: game)
    #[serde(default = "default_root_module")]
    pub root_module: String,

    /// Extension of script files (default: rhai)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directory the runtime loads from, relative to the project root.
    /// When unset the runtime reads the source directory directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_dir: Option<PathBuf>,

    /// Whether to watch the source directory for changes (default: true)
    #[serde(default = "default_watch")]
    pub watch: bool,

    /// File extensions that count as script changes; empty accepts all
    #[serde(default = "default_watch_extensions")]
    pub watch_extensions: Vec<String>,

    /// Treat a missing lifecycle entry point as an error (default: false)
    #[serde(default)]
    pub strict_entry_points: bool,

    /// Call Initialize again after every successful reload (default: false)
    #[serde(default)]
    pub reinitialize_on_reload: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("game")
}

fn default_root_module() -> String {
    "game".to_string()
}

fn default_extension() -> String {
    "rhai".to_string()
}

fn default_watch() -> bool {
    true
}

fn default_watch_extensions() -> Vec<String> {
    vec![default_extension()]
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            root_module: default_root_module(),
            extension: default_extension(),
            runtime_dir: None,
            watch: default_watch(),
            watch_extensions: default_watch_extensions(),
            strict_entry_points: false,
            reinitialize_on_reload: false,
        }
    }
}

impl ScriptsConfig {
    /// The root module as a logical identifier
    pub fn root_module_id(&self) -> ModuleId {
        ModuleId::new(&self.root_module)
    }
}
