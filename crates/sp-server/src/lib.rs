//! # sp-server
//!
//! Axum server for a SAML Service Provider.
//!
//! This crate wires the logout components of `sp-security` into HTTP:
//! - a CSRF-protected logout route running the SAML logout handler
//! - middleware recovering IdP-initiated logout from CSRF rejections
//! - an in-memory session store and environment-based configuration
//!
//! ## Usage
//!
//! ```ignore
//! use sp_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! Server::new(config).run().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod csrf;
pub mod error;
pub mod logout;
pub mod middleware;
pub mod router;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use router::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::session::SessionStore;

/// How often idle sessions are swept from the store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// The Service Provider server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Creates a new server instance.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Runs the server.
    ///
    /// This starts the HTTP server and blocks until it receives a shutdown signal.
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.state.config();
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            logout_path = %config.public_logout_path(),
            idp_slo = config.saml.idp.single_logout_service.is_some(),
            "Server listening on http://{}",
            addr
        );

        spawn_session_sweeper(Arc::clone(&self.state.sessions));

        let app = create_router(self.state.clone());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Periodically evicts idle sessions for the lifetime of the runtime.
fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.remove_expired();
            if removed > 0 {
                tracing::debug!(removed, "Evicted idle sessions");
            }
        }
    });
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
