//! Rendering collaborator used by scripts and by the error screen
//!
//! The engine never talks to a graphics API directly. Hosts implement
//! [`Renderer`] over whatever backend they drive (a GPU sprite batch, a
//! terminal grid, a test recorder).

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const CORNFLOWER_BLUE: Color = Color::rgb(100, 149, 237);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Screen position in backend units (pixels for a GPU backend, cells for a
/// terminal)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Errors raised by a rendering backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("begin called while a draw session is already open")]
    AlreadyDrawing,
    #[error("draw session is not open")]
    NotDrawing,
    #[error("unknown font `{0}`")]
    UnknownFont(String),
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// Drawing surface for one frame
///
/// Text may contain `\n`; backends lay out each line below the previous one.
pub trait Renderer {
    /// Fill the whole surface with a color
    fn clear(&mut self, color: Color);

    /// Open a draw session
    fn begin(&mut self) -> Result<(), RenderError>;

    /// Close the current draw session
    fn end(&mut self) -> Result<(), RenderError>;

    /// Whether a draw session is currently open
    fn is_drawing(&self) -> bool;

    /// Draw text inside the open session
    fn draw_text(
        &mut self,
        font: &str,
        text: &str,
        position: Position,
        color: Color,
    ) -> Result<(), RenderError>;
}
