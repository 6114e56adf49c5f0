//! Tracing initialization.
//!
//! The terminal is in raw mode during a session, so events go to a log
//! file instead of stderr.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the trainer's logging.
///
/// Reads `TRAINER_LOG` for the filter (e.g. `TRAINER_LOG=trainer=debug`).
/// Falls back to `trainer=info`, or `trainer=debug` when `debug` is set.
pub fn init_tracing(log_path: &Path, debug: bool) -> io::Result<()> {
    let fallback = if debug { "trainer=debug" } else { "trainer=info" };
    let filter = EnvFilter::try_from_env("TRAINER_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    Ok(())
}
