//! `oniond start`: config load, logging, PID file, and signal handling
//! around the core engine's run loop in `onion_core::orchestrator::run`.

use crate::{logging, pidfile::PidFile, signals};
use onion_core::config::DEFAULT_PID_FILE;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = onion_core::Config::load(config_path).await?;
    let _log_guard = logging::init(&config)?;

    let pid_file = PidFile::acquire(DEFAULT_PID_FILE)?;

    let cancel = CancellationToken::new();
    signals::spawn_shutdown_signal_task(cancel.clone());

    let result = onion_core::orchestrator::run(config, cancel).await;

    pid_file.release();
    result.map_err(|err| anyhow::anyhow!(err))
}
