//! src/logging.rs
//! ============================================================================
//! # Logging: Tracing Initialization for the Browser Core
//!
//! Sets up the `tracing` pipeline used by every module: an env-filtered fmt
//! layer writing to a daily-rolling log file through a non-blocking worker.
//! The host editor embeds the browser, so nothing is written to the host's
//! stdout/stderr by default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directive applied when `RUST_LOG` is unset.
const DEFAULT_LOG_LEVEL: &str = "info";

pub struct Logger;

impl Logger {
    /// Call **once** when the host embeds the browser core.
    ///
    /// Returns the appender worker guard; dropping it flushes and stops the
    /// background writer, so the host must keep it alive for the session.
    pub fn init(log_dir: impl Into<PathBuf>) -> Result<WorkerGuard> {
        let log_dir: PathBuf = log_dir.into();
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("cannot create log dir {}", log_dir.display()))?;

        let appender: RollingFileAppender =
            RollingFileAppender::new(Rotation::DAILY, &log_dir, "sfb.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let filter: EnvFilter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .try_init()
            .context("tracing subscriber already initialized")?;

        tracing::info!("Logging initialized in {}", log_dir.display());

        Ok(guard)
    }

    /// Default log location next to the config dir, falling back to `./logs`.
    #[must_use]
    pub fn default_log_dir() -> PathBuf {
        directories::ProjectDirs::from("org", "example", "SceneFileBrowser")
            .map_or_else(|| Path::new("logs").to_path_buf(), |dirs| {
                dirs.data_local_dir().join("logs")
            })
    }
}
