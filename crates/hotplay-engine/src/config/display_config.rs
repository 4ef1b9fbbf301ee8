use serde::{Deserialize, Serialize};

/// How the host presents frames and diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Font the error screen is drawn with
    #[serde(default = "default_error_font")]
    pub error_font: String,

    /// Column width diagnostics are wrapped to (default: 100)
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    /// Target frames per second for the host loop (default: 30)
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_error_font() -> String {
    "default".to_string()
}

fn default_wrap_width() -> usize {
    100
}

fn default_fps() -> u32 {
    30
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            error_font: default_error_font(),
            wrap_width: default_wrap_width(),
            fps: default_fps(),
        }
    }
}
