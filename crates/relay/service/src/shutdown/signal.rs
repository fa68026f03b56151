use tracing::{error, info};

/// Resolves on `SIGINT` or `SIGTERM`.
///
/// If the handlers cannot be installed the future never resolves, the relay then only stops on
/// task failure.
pub async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut interrupt, mut terminate) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
                (Err(err), _) | (_, Err(err)) => {
                    error!(target: "relay::shutdown", %err, "Failed to install signal handlers");
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = interrupt.recv() => info!(target: "relay::shutdown", "Received SIGINT"),
            _ = terminate.recv() => info!(target: "relay::shutdown", "Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!(target: "relay::shutdown", "Received ctrl-c"),
            Err(err) => {
                error!(target: "relay::shutdown", %err, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
    }
}
