use actix_web::dev::ServerHandle;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::job::JobService;

/// Resolves on CTRL+C, or SIGTERM on Unix.
///
/// If a handler cannot be installed the error is logged and that signal is
/// never observed.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown...");
        }
    }
}

/// Handles graceful shutdown of the server
///
/// 1. Waits for SIGTERM or SIGINT/CTRL+C
/// 2. Stops the HTTP server, letting in-flight webhooks finish
/// 3. Closes database connections
pub struct ShutdownCoordinator {
    server_handle: ServerHandle,
    server_task: JoinHandle<Result<(), std::io::Error>>,
    service: JobService,
}

impl ShutdownCoordinator {
    pub fn new(
        server_handle: ServerHandle,
        server_task: JoinHandle<Result<(), std::io::Error>>,
        service: JobService,
    ) -> Self {
        Self {
            server_handle,
            server_task,
            service,
        }
    }

    /// Wait for a shutdown signal, or for the server to exit on its own
    pub async fn wait_for_shutdown(mut self) -> Result<(), std::io::Error> {
        let exited = tokio::select! {
            _ = wait_for_signal() => None,
            result = &mut self.server_task => Some(result),
        };

        match exited {
            None => self.shutdown().await,
            Some(result) => {
                error!("HTTP server exited without a shutdown signal");
                self.service.close().await;
                result.map_err(std::io::Error::other)?
            }
        }
    }

    async fn shutdown(self) -> Result<(), std::io::Error> {
        // 1. Stop HTTP server (graceful: in-flight requests complete)
        info!("Stopping HTTP server (no longer accepting new requests)...");
        self.server_handle.stop(true).await;

        // 2. Wait for HTTP server task to complete
        let result = match self.server_task.await {
            Ok(Ok(())) => {
                info!("HTTP server shut down successfully");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("HTTP server encountered error during shutdown: {:?}", e);
                Err(e)
            }
            Err(e) => {
                error!("HTTP server task panicked: {:?}", e);
                Err(std::io::Error::other(e))
            }
        };

        // 3. Close database connections
        info!("Closing database connection pool...");
        self.service.close().await;
        info!("Database connections closed");

        info!("Graceful shutdown completed");
        result
    }
}
