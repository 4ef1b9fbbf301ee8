use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use hotplay_engine::rhai::RhaiRuntime;
use hotplay_engine::{LiveEngine, SourceLayout};
use hotplay_tui::event_handler::{action_for_key, EventHandler, KeyAction, TuiEvent};
use hotplay_tui::logging::{init_logging, LogOutput};
use hotplay_tui::ui::{canvas_size_for, try_init_tui};
use hotplay_tui::App;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project directory, or any directory inside it
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Enables debug mode (-dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Do not watch scripts; reload only with `r`
    #[arg(long)]
    no_watch: bool,

    /// Frames per second (overrides the project config)
    #[arg(long)]
    fps: Option<u32>,

    /// Log to the console instead of the log file
    #[arg(long)]
    log_stdout: bool,

    /// Run this many frames without a terminal UI, then print the last one
    #[arg(long)]
    frames: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let output = if cli.log_stdout {
        LogOutput::Stdout
    } else {
        LogOutput::File
    };
    let _log_guard = init_logging(output, cli.debug).context("Failed to initialize logging")?;

    let (layout, mut config) = SourceLayout::discover(&cli.project)
        .with_context(|| format!("No hotplay project at {}", cli.project.display()))?;
    if cli.no_watch {
        config.scripts.watch = false;
    }
    let fps = cli.fps.unwrap_or(config.display.fps).max(1);

    info!(
        "Running {} from {}",
        config.scripts.root_module,
        layout.source_dir().display()
    );

    let runtime = RhaiRuntime::new(layout.runtime_dir(), config.scripts.extension.clone());
    let engine =
        LiveEngine::new(layout, &config, Box::new(runtime)).context("Failed to start engine")?;
    let frame_time = Duration::from_secs_f64(1.0 / fps as f64);

    match cli.frames {
        Some(frames) => run_headless(engine, frames, frame_time),
        None => run_tui(engine, frame_time).await,
    }
}

fn run_headless(engine: LiveEngine, frames: u64, frame_time: Duration) -> anyhow::Result<()> {
    let (width, height) = canvas_size_for(80, 25);
    let mut app = App::new(engine, width, height);
    app.start();

    for _ in 0..frames {
        app.tick(frame_time);
    }

    for line in app.canvas.lines() {
        println!("{}", line);
    }
    println!("{}", app.status_line());

    if app.is_frozen() {
        anyhow::bail!("game is frozen on a script error");
    }
    Ok(())
}

async fn run_tui(engine: LiveEngine, frame_time: Duration) -> anyhow::Result<()> {
    let mut tui = try_init_tui().context("Failed to initialize terminal")?;
    let (width, height) = tui.canvas_size()?;
    let mut app = App::new(engine, width, height);
    app.start();

    let (event_handler, mut tui_event_rx) = EventHandler::new();
    let event_handle = event_handler.start();

    let mut interval = tokio::time::interval(frame_time);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                app.tick(now.duration_since(last_frame));
                last_frame = now;

                if let Err(e) = tui.draw(&app) {
                    error!("Failed to draw frame: {}", e);
                    break;
                }
            }
            Some(tui_event) = tui_event_rx.recv() => {
                handle_tui_event(&mut app, tui_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("Shutting down");

    // Restore the terminal before anything else prints
    drop(tui);
    event_handle.shutdown();
    app.engine.shutdown();

    Ok(())
}

fn handle_tui_event(app: &mut App, tui_event: TuiEvent) {
    match tui_event {
        TuiEvent::Key(key) => match action_for_key(&key) {
            Some(KeyAction::Quit) => app.should_quit = true,
            Some(KeyAction::Reload) => app.request_reload(),
            None => {}
        },
        TuiEvent::Resize(width, height) => {
            let (width, height) = canvas_size_for(width, height);
            app.resize(width, height);
        }
        TuiEvent::Quit => {
            info!("Received Ctrl+C, shutting down");
            app.should_quit = true;
        }
    }
}
