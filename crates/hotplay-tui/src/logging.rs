use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAX_LOG_SIZE: u64 = 1024 * 1024; // 1MB

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// A log file in the data directory. Used while the terminal UI owns
    /// stdout.
    File,
    /// Plain console output
    Stdout,
}

/// Filter used when `RUST_LOG` is not set: `-d` enables debug, `-dd` trace
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "info,hotplay=debug,hotplay_engine=debug,hotplay_tui=debug",
        _ => "trace",
    }
}

/// Initialize logging for the host.
///
/// Returns a guard that must be kept alive for the duration of the program
/// when logging to a file.
pub fn init_logging(output: LogOutput, verbosity: u8) -> io::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    match output {
        LogOutput::File => {
            let log_dir = get_log_directory()?;
            fs::create_dir_all(&log_dir)?;
            let log_path = log_dir.join("hotplay.log");

            truncate_if_needed(&log_path)?;

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(BufWriter::new(file));

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking_file)
                        .with_ansi(false)
                        .with_target(true),
                )
                .init();

            tracing::info!("Logging to file: {}", log_path.display());
            Ok(Some(guard))
        }
        LogOutput::Stdout => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
                .init();
            Ok(None)
        }
    }
}

/// Get the log directory path.
pub fn get_log_directory() -> io::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "hotplay").ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Failed to find home directory")
    })?;
    Ok(dirs.data_dir().join("logs"))
}

/// Truncate log file if it exceeds MAX_LOG_SIZE.
fn truncate_if_needed(log_path: &Path) -> io::Result<()> {
    if log_path.exists() {
        let metadata = fs::metadata(log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            let file = File::create(log_path)?;
            file.set_len(0)?;
        }
    }
    Ok(())
}
