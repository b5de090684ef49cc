//! SIGINT/SIGTERM → request an orderly shutdown by cancelling the shared
//! token.

use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn spawn_shutdown_signal_task(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(err) = wait_for_shutdown_signal(cancel).await {
            tracing::warn!(error = %err, "failed to install shutdown signal handler");
        }
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal(cancel: CancellationToken) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = sigterm.recv() => {
            info!("received SIGTERM, requesting shutdown");
            cancel.cancel();
        }
        _ = sigint.recv() => {
            info!("received SIGINT, requesting shutdown");
            cancel.cancel();
        }
    }

    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal(cancel: CancellationToken) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("received ctrl-c, requesting shutdown");
    cancel.cancel();
    Ok(())
}
