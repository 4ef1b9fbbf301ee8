//! A character grid that games draw into
//!
//! One cell per character. Positions from scripts are in cells, so
//! `canvas.text("hi", 2, 1)` starts at column 2 of the second row.

use hotplay_engine::{Color, Position, RenderError, Renderer};
use ratatui::style::{Color as TermColor, Style};
use ratatui::text::{Line, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::WHITE,
            bg,
        }
    }
}

/// [`Renderer`] over a fixed-size character grid
#[derive(Debug, Clone)]
pub struct TerminalCanvas {
    width: u16,
    height: u16,
    background: Color,
    cells: Vec<Cell>,
    drawing: bool,
}

impl TerminalCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            background: Color::BLACK,
            cells: vec![Cell::blank(Color::BLACK); width as usize * height as usize],
            drawing: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Change the grid size, blanking its contents
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::blank(self.background); width as usize * height as usize];
    }

    /// Plain text of every row, trailing spaces removed
    pub fn lines(&self) -> Vec<String> {
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.ch)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    /// Rows as styled ratatui lines, merging runs of equally colored cells
    pub fn styled_lines(&self) -> Vec<Line<'static>> {
        self.rows()
            .map(|row| {
                let mut spans = Vec::new();
                let mut run = String::new();
                let mut run_style: Option<(Color, Color)> = None;

                for cell in row {
                    let style = (cell.fg, cell.bg);
                    if run_style.is_some_and(|current| current != style) {
                        spans.push(styled_span(std::mem::take(&mut run), run_style));
                    }
                    run_style = Some(style);
                    run.push(cell.ch);
                }
                if !run.is_empty() {
                    spans.push(styled_span(run, run_style));
                }
                Line::from(spans)
            })
            .collect()
    }

    fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks panics on a zero size
        self.cells.chunks(self.width.max(1) as usize)
    }

    fn put(&mut self, column: i64, row: i64, ch: char, fg: Color) {
        if column < 0 || row < 0 || column >= self.width as i64 || row >= self.height as i64 {
            return;
        }
        let index = row as usize * self.width as usize + column as usize;
        let cell = &mut self.cells[index];
        cell.ch = ch;
        cell.fg = fg;
    }
}

fn styled_span(text: String, style: Option<(Color, Color)>) -> Span<'static> {
    match style {
        Some((fg, bg)) => Span::styled(
            text,
            Style::default().fg(term_color(fg)).bg(term_color(bg)),
        ),
        None => Span::raw(text),
    }
}

/// Map an engine color to a 24-bit terminal color. Alpha is ignored.
pub fn term_color(color: Color) -> TermColor {
    TermColor::Rgb(color.r, color.g, color.b)
}

impl Renderer for TerminalCanvas {
    fn clear(&mut self, color: Color) {
        self.background = color;
        self.cells.fill(Cell::blank(color));
    }

    fn begin(&mut self) -> Result<(), RenderError> {
        if self.drawing {
            return Err(RenderError::AlreadyDrawing);
        }
        self.drawing = true;
        Ok(())
    }

    fn end(&mut self) -> Result<(), RenderError> {
        if !self.drawing {
            return Err(RenderError::NotDrawing);
        }
        self.drawing = false;
        Ok(())
    }

    fn is_drawing(&self) -> bool {
        self.drawing
    }

    fn draw_text(
        &mut self,
        _font: &str,
        text: &str,
        position: Position,
        color: Color,
    ) -> Result<(), RenderError> {
        if !self.drawing {
            return Err(RenderError::NotDrawing);
        }

        let column = position.x.round() as i64;
        let top = position.y.round() as i64;
        for (offset, line) in text.lines().enumerate() {
            for (index, ch) in line.chars().enumerate() {
                self.put(column + index as i64, top + offset as i64, ch, color);
            }
        }
        Ok(())
    }
}
