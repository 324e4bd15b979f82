//! Server startup helper for embedding in the device binary.
//!
//! Provides [`spawn_api`] which binds the listener in the caller's task,
//! so a taken port fails start-up immediately, and then serves on a
//! background Tokio task alongside the device loop.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind and spawn the HTTP server on a background task.
///
/// The server stops once `shutdown` flips to `true`. Await the returned
/// handle to wait for in-flight requests to finish.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_api(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "HTTP server exited with error");
        }
    });

    tracing::info!(
        host = %config.host,
        port = config.port,
        "HTTP server spawned on background task"
    );

    Ok(handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn spawned_server_stops_on_shutdown() {
        let (tx, _rx) = mpsc::channel(1);
        let state = Arc::new(AppState::new(tx, Duration::from_millis(100)));
        let config = ServerConfig {
            host: String::from("127.0.0.1"),
            port: 0,
        };
        let (stop, shutdown) = watch::channel(false);

        let handle = spawn_api(&config, state, shutdown).await.unwrap();
        stop.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn bad_address_fails_eagerly() {
        let (tx, _rx) = mpsc::channel(1);
        let state = Arc::new(AppState::new(tx, Duration::from_millis(100)));
        let config = ServerConfig {
            host: String::from("not an address"),
            port: 80,
        };
        let (_stop, shutdown) = watch::channel(false);

        let result = spawn_api(&config, state, shutdown).await;
        assert!(matches!(
            result,
            Err(StartupError::Server(ServerError::Bind(_)))
        ));
    }
}
