pub(crate) mod bindings;
mod engine;
mod runtime;

pub use bindings::{Canvas, DrawCommand, DEFAULT_FONT};
pub use engine::{create_engine, file_resolver};
pub use runtime::RhaiRuntime;
