//! Host API exposed to Rhai scripts

use std::cell::RefCell;
use std::rc::Rc;

use rhai::{Dynamic, Engine, Map, FLOAT, INT};
use tracing::info;

use crate::render::{Color, Position, RenderError, Renderer};
use crate::runtime::FrameInfo;

/// Font used when a script never picks one
pub const DEFAULT_FONT: &str = "default";

/// A drawing operation recorded by a script's `Draw`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Text {
        font: String,
        text: String,
        position: Position,
        color: Color,
    },
}

#[derive(Debug, Default)]
struct CanvasState {
    font: Option<String>,
    commands: Vec<DrawCommand>,
}

/// Drawing surface handed to `Draw(frame, canvas)`
///
/// Scripts only record commands; the host replays them against its
/// [`Renderer`] once the call returns.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    state: Rc<RefCell<CanvasState>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.state.borrow().commands.clone()
    }

    fn push(&self, command: DrawCommand) {
        self.state.borrow_mut().commands.push(command);
    }

    fn clear(&mut self, color: Color) {
        self.push(DrawCommand::Clear(color));
    }

    fn set_font(&mut self, font: &str) {
        self.state.borrow_mut().font = Some(font.to_string());
    }

    fn text(&mut self, text: &str, x: FLOAT, y: FLOAT, color: Color) {
        let font = self
            .state
            .borrow()
            .font
            .clone()
            .unwrap_or_else(|| DEFAULT_FONT.to_string());
        self.push(DrawCommand::Text {
            font,
            text: text.to_string(),
            position: Position::new(x as f32, y as f32),
            color,
        });
    }

    /// Send the recorded commands to `renderer`
    ///
    /// Text is drawn inside a single begin/end session. Clears are issued
    /// where they were recorded.
    pub fn replay(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let commands = std::mem::take(&mut self.state.borrow_mut().commands);

        for command in &commands {
            match command {
                DrawCommand::Clear(color) => renderer.clear(*color),
                DrawCommand::Text {
                    font,
                    text,
                    position,
                    color,
                } => {
                    if !renderer.is_drawing() {
                        renderer.begin()?;
                    }
                    renderer.draw_text(font, text, *position, *color)?;
                }
            }
        }

        if renderer.is_drawing() {
            renderer.end()?;
        }
        Ok(())
    }
}

fn channel(value: INT) -> u8 {
    value.clamp(0, 255) as u8
}

/// Frame timing as a script-visible object map
pub(crate) fn frame_map(frame: &FrameInfo) -> Dynamic {
    let mut map = Map::new();
    map.insert("frame".into(), (frame.frame as INT).into());
    map.insert("elapsed".into(), (frame.elapsed.as_secs_f64() as FLOAT).into());
    map.insert("total".into(), (frame.total.as_secs_f64() as FLOAT).into());
    map.into()
}

pub(crate) fn register_api(engine: &mut Engine) {
    engine.register_type_with_name::<Color>("Color");
    engine.register_fn("rgb", |r: INT, g: INT, b: INT| {
        Color::rgb(channel(r), channel(g), channel(b))
    });
    engine.register_fn("rgba", |r: INT, g: INT, b: INT, a: INT| {
        Color::rgba(channel(r), channel(g), channel(b), channel(a))
    });
    engine.register_get("r", |color: &mut Color| color.r as INT);
    engine.register_get("g", |color: &mut Color| color.g as INT);
    engine.register_get("b", |color: &mut Color| color.b as INT);

    engine.register_type_with_name::<Canvas>("Canvas");
    engine.register_fn("clear", Canvas::clear);
    engine.register_fn("font", Canvas::set_font);
    engine.register_fn("text", Canvas::text);
    engine.register_fn("text", |canvas: &mut Canvas, text: &str, x: FLOAT, y: FLOAT| {
        canvas.text(text, x, y, Color::WHITE)
    });
    engine.register_fn(
        "text",
        |canvas: &mut Canvas, text: &str, x: INT, y: INT, color: Color| {
            canvas.text(text, x as FLOAT, y as FLOAT, color)
        },
    );
    engine.register_fn("text", |canvas: &mut Canvas, text: &str, x: INT, y: INT| {
        canvas.text(text, x as FLOAT, y as FLOAT, Color::WHITE)
    });
    // Mixed coordinates, e.g. a moving x on a fixed row
    engine.register_fn(
        "text",
        |canvas: &mut Canvas, text: &str, x: FLOAT, y: INT, color: Color| {
            canvas.text(text, x, y as FLOAT, color)
        },
    );
    engine.register_fn("text", |canvas: &mut Canvas, text: &str, x: FLOAT, y: INT| {
        canvas.text(text, x, y as FLOAT, Color::WHITE)
    });
    engine.register_fn(
        "text",
        |canvas: &mut Canvas, text: &str, x: INT, y: FLOAT, color: Color| {
            canvas.text(text, x as FLOAT, y, color)
        },
    );
    engine.register_fn("text", |canvas: &mut Canvas, text: &str, x: INT, y: FLOAT| {
        canvas.text(text, x as FLOAT, y, Color::WHITE)
    });

    engine.register_fn("log", |message: &str| {
        info!(target: "script", "{}", message);
    });
}
