//! Graceful shutdown signal handling.

use tracing::info;

/// Resolve when the process receives ctrl-c or SIGTERM.
///
/// Passed to `axum::serve(..).with_graceful_shutdown` so in-flight uploads
/// finish (or cancel and clean up their media) before the listener closes.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("shutdown: received ctrl-c"),
        _ = terminate => info!("shutdown: received SIGTERM"),
    }
}
