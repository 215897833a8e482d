//! Server Implementation
//!
//! Binds the HTTP listener, serves the API router and drains in-flight
//! requests on Ctrl-C.

use std::future::IntoFuture;
use std::time::Duration;

use crate::api;
use crate::core::{Config, Result, ServerState};

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let app = api::build_app(state);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Pizza server listening on {}", addr);

        let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            res = &mut serve => res?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                let _ = stop_tx.send(true);
                let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
                match tokio::time::timeout(grace, serve).await {
                    Ok(res) => res?,
                    Err(_) => tracing::warn!(?grace, "Graceful shutdown timed out, dropping connections"),
                }
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
