pub mod app;
pub mod canvas;
pub mod event_handler;
pub mod logging;
pub mod ui;

pub use app::App;
pub use canvas::TerminalCanvas;
