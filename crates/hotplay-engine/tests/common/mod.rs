//! In-memory script runtime and recording renderer shared by the
//! integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use hotplay_engine::{
    Color, EntryPoint, EntryPointHandle, HotplayConfig, Invocation, LiveEngine, ModuleId,
    Position, RenderError, Renderer, ScriptFault, ScriptRuntime, SourceLayout,
};

/// How a scripted function behaves when called
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Succeed,
    Throw(String),
    /// The runtime cannot even produce a handle for it
    Unresolvable(String),
}

/// Source of one module as the fake runtime would find it on disk
#[derive(Debug, Clone, Default)]
pub struct FakeModule {
    pub version: u32,
    pub load_error: Option<String>,
    pub functions: HashMap<String, Behavior>,
}

impl FakeModule {
    /// A module exporting every lifecycle entry point
    pub fn game(version: u32) -> Self {
        Self::empty(version)
            .with("Initialize", Behavior::Succeed)
            .with("LoadContent", Behavior::Succeed)
            .with("Update", Behavior::Succeed)
            .with("Draw", Behavior::Succeed)
    }

    pub fn empty(version: u32) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    pub fn broken(version: u32, message: &str) -> Self {
        Self {
            version,
            load_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with(mut self, symbol: &str, behavior: Behavior) -> Self {
        self.functions.insert(symbol.to_string(), behavior);
        self
    }

    pub fn without(mut self, symbol: &str) -> Self {
        self.functions.remove(symbol);
        self
    }
}

/// Everything the fake runtime knows and did
#[derive(Debug, Default)]
pub struct World {
    /// Current sources, editable by tests
    pub sources: HashMap<ModuleId, FakeModule>,
    /// Snapshot taken at the last successful load of each module
    pub loaded: HashMap<ModuleId, FakeModule>,
    /// Every load attempt, in order
    pub loads: Vec<ModuleId>,
    /// Every entry point call as `Symbol@version`
    pub calls: Vec<String>,
}

impl World {
    pub fn shared() -> Rc<RefCell<World>> {
        Rc::new(RefCell::new(World::default()))
    }
}

pub fn set_source(world: &Rc<RefCell<World>>, module: &str, source: FakeModule) {
    world
        .borrow_mut()
        .sources
        .insert(ModuleId::new(module), source);
}

pub fn calls(world: &Rc<RefCell<World>>) -> Vec<String> {
    world.borrow().calls.clone()
}

pub fn take_calls(world: &Rc<RefCell<World>>) -> Vec<String> {
    std::mem::take(&mut world.borrow_mut().calls)
}

pub struct FakeRuntime {
    world: Rc<RefCell<World>>,
}

impl FakeRuntime {
    pub fn new(world: Rc<RefCell<World>>) -> Self {
        Self { world }
    }
}

impl ScriptRuntime for FakeRuntime {
    fn load_module(&mut self, module: &ModuleId) -> Result<(), ScriptFault> {
        let mut world = self.world.borrow_mut();
        world.loads.push(module.clone());

        let source = world
            .sources
            .get(module)
            .cloned()
            .ok_or_else(|| ScriptFault::new(format!("no module named {module}")))?;

        if let Some(message) = &source.load_error {
            return Err(ScriptFault::new("compile error").with_cause(message.clone()));
        }

        world.loaded.insert(module.clone(), source);
        Ok(())
    }

    fn resolve_symbol(
        &mut self,
        module: &ModuleId,
        symbol: &str,
    ) -> Result<Option<EntryPointHandle>, ScriptFault> {
        let world = self.world.borrow();
        let loaded = world
            .loaded
            .get(module)
            .ok_or_else(|| ScriptFault::new(format!("{module} is not loaded")))?;

        match loaded.functions.get(symbol) {
            None => Ok(None),
            Some(Behavior::Unresolvable(message)) => {
                Err(ScriptFault::new("cannot bind").with_cause(message.clone()))
            }
            Some(behavior) => Ok(Some(Rc::new(FakeEntryPoint {
                world: self.world.clone(),
                symbol: symbol.to_string(),
                version: loaded.version,
                behavior: behavior.clone(),
            }))),
        }
    }
}

struct FakeEntryPoint {
    world: Rc<RefCell<World>>,
    symbol: String,
    version: u32,
    behavior: Behavior,
}

impl EntryPoint for FakeEntryPoint {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn invoke(&self, invocation: Invocation<'_>) -> Result<(), ScriptFault> {
        self.world
            .borrow_mut()
            .calls
            .push(format!("{}@{}", self.symbol, self.version));

        if let Invocation::Draw(frame, renderer) = invocation {
            renderer.clear(Color::CORNFLOWER_BLUE);
            renderer
                .begin()
                .map_err(|e| ScriptFault::new(e.to_string()))?;
            let text = format!("frame {}", frame.frame);
            renderer
                .draw_text("default", &text, Position::ZERO, Color::WHITE)
                .map_err(|e| ScriptFault::new(e.to_string()))?;
            // A throwing Draw leaves the session open
            if let Behavior::Throw(message) = &self.behavior {
                return Err(ScriptFault::new("Draw threw").with_cause(message.clone()));
            }
            return renderer.end().map_err(|e| ScriptFault::new(e.to_string()));
        }

        match &self.behavior {
            Behavior::Throw(message) => Err(ScriptFault::new(format!(
                "error in function {}",
                self.symbol
            ))
            .with_cause(message.clone())),
            _ => Ok(()),
        }
    }
}

/// Renderer that records calls and enforces begin/end pairing
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub drawing: bool,
    pub calls: Vec<String>,
}

impl RecordingRenderer {
    /// All text drawn so far, joined
    pub fn text(&self) -> String {
        self.calls
            .iter()
            .filter_map(|call| call.strip_prefix("text "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, color: Color) {
        self.calls
            .push(format!("clear {},{},{}", color.r, color.g, color.b));
    }

    fn begin(&mut self) -> Result<(), RenderError> {
        if self.drawing {
            return Err(RenderError::AlreadyDrawing);
        }
        self.drawing = true;
        self.calls.push("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<(), RenderError> {
        if !self.drawing {
            return Err(RenderError::NotDrawing);
        }
        self.drawing = false;
        self.calls.push("end".to_string());
        Ok(())
    }

    fn is_drawing(&self) -> bool {
        self.drawing
    }

    fn draw_text(
        &mut self,
        _font: &str,
        text: &str,
        _position: Position,
        _color: Color,
    ) -> Result<(), RenderError> {
        if !self.drawing {
            return Err(RenderError::NotDrawing);
        }
        self.calls.push(format!("text {text}"));
        Ok(())
    }
}

/// Config for tests that drive reloads by hand
pub fn manual_config() -> HotplayConfig {
    let mut config = HotplayConfig::default();
    config.scripts.watch = false;
    config
}

/// An engine over the fake runtime; nothing touches the filesystem
pub fn fake_engine(world: &Rc<RefCell<World>>, config: &HotplayConfig) -> LiveEngine {
    let layout = SourceLayout::new(Path::new("/project"), &config.scripts);
    LiveEngine::new(layout, config, Box::new(FakeRuntime::new(world.clone())))
        .expect("engine without watcher starts")
}
