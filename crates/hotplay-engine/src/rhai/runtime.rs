use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rhai::{
    CallFnOptions, Dynamic, Engine, EvalAltResult, FnAccess, Map, Module, Scope, AST,
};
use tracing::{debug, trace};

use super::bindings::{frame_map, Canvas};
use super::engine::create_engine;
use crate::error::ScriptFault;
use crate::module_id::ModuleId;
use crate::runtime::{EntryPoint, EntryPointHandle, Invocation, ScriptRuntime};

/// Extra host API installed on every engine the runtime creates
type ApiHook = Rc<dyn Fn(&mut Engine)>;

/// A module evaluated by the runtime
///
/// Each load gets its own engine with the evaluated module registered as its
/// global namespace, so entry points run without evaluating the module body
/// again. Functions keep the imports that were in effect at load time.
struct LoadedModule {
    engine: Engine,
    ast: AST,
    /// Ids of every module imported, directly or through another import
    imports: BTreeSet<String>,
}

/// [`ScriptRuntime`] backed by the Rhai interpreter
///
/// Modules are files under the runtime directory. A module's top-level code
/// runs once per load. Entry points are called with a game state object map
/// bound to `this`, shared by every module and kept across reloads.
///
/// Reloading a module also re-evaluates every loaded module that imports it,
/// so their functions pick up the new definitions.
pub struct RhaiRuntime {
    module_root: PathBuf,
    extension: String,
    api: Vec<ApiHook>,
    modules: HashMap<ModuleId, Rc<LoadedModule>>,
    state: Rc<RefCell<Dynamic>>,
}

impl RhaiRuntime {
    pub fn new(module_root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            module_root: module_root.into(),
            extension: extension.into(),
            api: Vec::new(),
            modules: HashMap::new(),
            state: Rc::new(RefCell::new(Dynamic::from_map(Map::new()))),
        }
    }

    /// Register additional functions or types for scripts
    pub fn with_api(mut self, register: impl Fn(&mut Engine) + 'static) -> Self {
        self.api.push(Rc::new(register));
        self
    }

    pub fn module_root(&self) -> &Path {
        &self.module_root
    }

    /// The object scripts see as `this`
    pub fn state(&self) -> Dynamic {
        self.state.borrow().clone()
    }

    pub fn is_loaded(&self, module: &ModuleId) -> bool {
        self.modules.contains_key(module)
    }

    fn evaluate(&self, module: &ModuleId) -> Result<LoadedModule, ScriptFault> {
        let path = module.to_path(&self.module_root, &self.extension);
        trace!(target: "hotplay", "Evaluating {}", path.display());

        let source = fs::read_to_string(&path).map_err(|e| {
            ScriptFault::new(format!("cannot read {}", path.display())).with_cause(e.to_string())
        })?;

        // A fresh engine also means a fresh import cache
        let mut engine = create_engine(&self.module_root, &self.extension);
        for register in &self.api {
            register(&mut engine);
        }

        let mut ast = engine
            .compile(&source)
            .map_err(|e| ScriptFault::new(format!("{}: {}", path.display(), e)))?;
        ast.set_source(module.as_str());

        let evaluated =
            Module::eval_ast_as_new(Scope::new(), &ast, &engine).map_err(|e| fault_from_eval(&e))?;

        let mut imports = BTreeSet::new();
        collect_imports(&evaluated, &mut imports);
        engine.register_global_module(evaluated.into());

        Ok(LoadedModule {
            engine,
            ast,
            imports,
        })
    }

    /// Loaded modules other than `module` that import it
    fn dependents_of(&self, module: &ModuleId) -> Vec<ModuleId> {
        let mut dependents: Vec<ModuleId> = self
            .modules
            .iter()
            .filter(|(id, loaded)| *id != module && loaded.imports.contains(module.as_str()))
            .map(|(id, _)| id.clone())
            .collect();
        dependents.sort();
        dependents
    }
}

fn collect_imports(module: &Module, into: &mut BTreeSet<String>) {
    for (_, imported) in module.iter_sub_modules() {
        let first_seen = match imported.id() {
            Some(id) => into.insert(id.to_string()),
            None => true,
        };
        if first_seen {
            collect_imports(imported, into);
        }
    }
}

impl ScriptRuntime for RhaiRuntime {
    fn load_module(&mut self, module: &ModuleId) -> Result<(), ScriptFault> {
        let loaded = self.evaluate(module)?;
        debug!(
            target: "hotplay",
            "Evaluated {} ({} functions)",
            module,
            loaded.ast.iter_functions().count()
        );
        self.modules.insert(module.clone(), Rc::new(loaded));

        for dependent in self.dependents_of(module) {
            debug!(target: "hotplay", "Re-evaluating {} (imports {})", dependent, module);
            let loaded = self.evaluate(&dependent).map_err(|fault| {
                let message = format!("`{}` imports `{}`: {}", dependent, module, fault.message);
                match fault.cause {
                    Some(cause) => ScriptFault::new(message).with_cause(cause),
                    None => ScriptFault::new(message),
                }
            })?;
            self.modules.insert(dependent, Rc::new(loaded));
        }
        Ok(())
    }

    fn resolve_symbol(
        &mut self,
        module: &ModuleId,
        symbol: &str,
    ) -> Result<Option<EntryPointHandle>, ScriptFault> {
        let loaded = self
            .modules
            .get(module)
            .ok_or_else(|| ScriptFault::new(format!("module `{}` is not loaded", module)))?;

        // Private functions are not part of the evaluated module
        let arity = loaded
            .ast
            .iter_functions()
            .filter(|function| function.name == symbol && function.access == FnAccess::Public)
            .map(|function| function.params.len())
            .max();

        Ok(arity.map(|arity| {
            Rc::new(RhaiEntryPoint {
                module: loaded.clone(),
                symbol: symbol.to_string(),
                arity,
                state: self.state.clone(),
            }) as EntryPointHandle
        }))
    }
}

/// A script function bound to a lifecycle role
struct RhaiEntryPoint {
    module: Rc<LoadedModule>,
    symbol: String,
    arity: usize,
    state: Rc<RefCell<Dynamic>>,
}

impl RhaiEntryPoint {
    fn call(&self, mut args: Vec<Dynamic>) -> Result<(), ScriptFault> {
        // Entry points may ignore trailing arguments
        args.truncate(self.arity);

        let mut this = self.state.borrow_mut();
        // The function lives in the engine's global namespace, not in an AST
        let options = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .in_all_namespaces(true)
            .bind_this_ptr(&mut *this);

        self.module
            .engine
            .call_fn_with_options::<Dynamic>(
                options,
                &mut Scope::new(),
                &AST::empty(),
                &self.symbol,
                args,
            )
            .map(|_| ())
            .map_err(|e| fault_from_eval(&e))
    }
}

impl EntryPoint for RhaiEntryPoint {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn invoke(&self, invocation: Invocation<'_>) -> Result<(), ScriptFault> {
        match invocation {
            Invocation::Initialize | Invocation::LoadContent => self.call(Vec::new()),
            Invocation::Update(frame) => self.call(vec![frame_map(frame)]),
            Invocation::Draw(frame, renderer) => {
                let canvas = Canvas::new();
                self.call(vec![frame_map(frame), Dynamic::from(canvas.clone())])?;
                canvas.replay(renderer).map_err(|e| {
                    ScriptFault::new(format!("{} could not render", self.symbol))
                        .with_cause(e.to_string())
                })
            }
        }
    }
}

/// Split a Rhai error into its message and the error it wraps
fn fault_from_eval(err: &EvalAltResult) -> ScriptFault {
    let fault = ScriptFault::new(err.to_string());
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => fault.with_cause(innermost(inner)),
        _ => fault,
    }
}

fn innermost(err: &EvalAltResult) -> String {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => innermost(inner),
        _ => err.to_string(),
    }
}
