use std::io;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::App;

/// Rows reserved below the game canvas
pub const STATUS_HEIGHT: u16 = 1;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let options = ratatui::TerminalOptions {
            viewport: ratatui::Viewport::Fullscreen,
        };
        let terminal = Terminal::with_options(backend, options)?;

        Ok(Self { terminal })
    }

    /// Size available to the game canvas
    pub fn canvas_size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok(canvas_size_for(size.width, size.height))
    }

    pub fn draw(&mut self, app: &App) -> io::Result<()> {
        self.terminal.draw(|frame| render(frame, app))?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        execute!(io::stdout(), LeaveAlternateScreen).ok();
        disable_raw_mode().ok();
    }
}

pub fn try_init_tui() -> io::Result<Tui> {
    Tui::new()
}

/// Canvas dimensions for a terminal of the given size
pub fn canvas_size_for(width: u16, height: u16) -> (u16, u16) {
    (width, height.saturating_sub(STATUS_HEIGHT))
}

fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
        .split(frame.area());

    frame.render_widget(Paragraph::new(app.canvas.styled_lines()), chunks[0]);
    render_status_bar(frame, chunks[1], app);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let style = if app.is_frozen() {
        Style::default().bg(Color::Red).fg(Color::White).bold()
    } else {
        Style::default().bg(Color::White).fg(Color::Black)
    };

    let spans = vec![
        Span::styled(format!(" {}", app.status_line()), style),
        Span::styled(
            "  q quit | r reload ",
            Style::default().bg(Color::Gray).fg(Color::Black),
        ),
    ];
    let paragraph = Paragraph::new(Line::from(spans)).style(style);

    frame.render_widget(paragraph, area);
}
