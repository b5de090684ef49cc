//! Structured logging: a stdout sink gated by `logging.enable`, and an
//! always-on file sink at `logging.file`. The configured `logging.level`
//! sets both sinks' minimum severity; the `ONION_LOG` environment variable
//! overrides it entirely when an operator wants finer (debug) traces
//! without editing the config file.

use onion_core::config::{Config, LogLevel};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Must be kept alive for the life of the process: dropping it stops the
/// non-blocking file writer from flushing.
pub fn init(config: &Config) -> anyhow::Result<WorkerGuard> {
    let default_level = match config.logging.level {
        LogLevel::Info => "info",
        LogLevel::Warning => "warn",
        LogLevel::Error => "error",
    };
    let env_filter = EnvFilter::try_from_env("ONION_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_dir = config
        .logging
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = config
        .logging
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "oniond.log".to_string());

    std::fs::create_dir_all(file_dir)?;
    let file_appender = tracing_appender::rolling::never(file_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = config.logging.enable.then(|| tracing_subscriber::fmt::layer());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
