pub mod display_config;
pub mod hotplay_config;
pub mod scripts_config;

pub use display_config::DisplayConfig;
pub use hotplay_config::{ConfigLoadError, HotplayConfig, MARKER_FILE};
pub use scripts_config::ScriptsConfig;
