use std::path::Path;

use rhai::module_resolvers::FileModuleResolver;
use rhai::Engine;
use tracing::{debug, info};

use super::bindings;

/// Create a configured Rhai engine for script execution
///
/// `import` statements resolve against `module_root`.
pub fn create_engine(module_root: &Path, extension: &str) -> Engine {
    let mut engine = Engine::new();
    engine.set_fast_operators(true);
    engine.set_module_resolver(file_resolver(module_root, extension));

    engine.on_print(|text| info!(target: "script", "{}", text));
    engine.on_debug(|text, source, pos| match source {
        Some(source) => debug!(target: "script", "{} @ {:?}: {}", source, pos, text),
        None => debug!(target: "script", "{:?}: {}", pos, text),
    });

    bindings::register_api(&mut engine);
    engine
}

/// Module resolver over the runtime directory
///
/// A fresh resolver starts with an empty cache, so installing one forgets
/// every previously imported module.
pub fn file_resolver(module_root: &Path, extension: &str) -> FileModuleResolver {
    FileModuleResolver::new_with_path_and_extension(module_root, extension)
}
