//! Logging setup: journald on Linux, rolling file elsewhere.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter() -> EnvFilter {
    EnvFilter::try_from_env("RENOVA_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the logging system. The `RENOVA_LOG` environment variable
/// controls the level (trace, debug, info, warn, error); default info.
///
/// On Linux this connects to systemd-journald when available; otherwise
/// (and on other platforms) a daily-rolling file under `log_dir` is
/// used.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    #[cfg(target_os = "linux")]
    if let Ok(journald) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter())
            .with(journald)
            .init();
        tracing::info!("Logging initialized with journald backend");
        return Ok(());
    }

    let log_dir = match log_dir {
        Some(dir) => dir,
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("renova")
            .join("logs"),
    };
    std::fs::create_dir_all(&log_dir)?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "renova.log"));

    // The non-blocking writer stops flushing once its guard drops, so
    // park it for the life of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    tracing::info!("Logging initialized with file backend at {:?}", log_dir);
    Ok(())
}
