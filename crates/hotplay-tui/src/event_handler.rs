use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Quit,
}

/// What a key press asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Reload,
}

/// Map a key press to a host action
pub fn action_for_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('r') | KeyCode::F(5) => Some(KeyAction::Reload),
        _ => None,
    }
}

pub struct EventHandler {
    tx: mpsc::UnboundedSender<TuiEvent>,
}

impl EventHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TuiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Poll terminal events on a blocking task until shut down or the
    /// receiver goes away
    pub fn start(self) -> EventHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let task_stop = stop.clone();

        let task = tokio::task::spawn_blocking(move || {
            while !task_stop.load(Ordering::Relaxed) {
                if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                    continue;
                }
                let tui_event = match event::read() {
                    Ok(Event::Key(key))
                        if key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c') =>
                    {
                        TuiEvent::Quit
                    }
                    Ok(Event::Key(key)) => TuiEvent::Key(key),
                    Ok(Event::Resize(width, height)) => TuiEvent::Resize(width, height),
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("Failed to read terminal event: {}", e);
                        continue;
                    }
                };
                if self.tx.send(tui_event).is_err() {
                    break;
                }
            }
        });

        EventHandle { stop, task }
    }
}

/// Running event polling task
pub struct EventHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl EventHandle {
    /// Ask the polling task to stop; it exits within one poll interval
    pub fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);
        drop(self.task);
    }
}
