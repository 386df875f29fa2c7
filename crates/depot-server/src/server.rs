use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use depot::{Depot, Storage};

use crate::config::{BackendKind, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Depot HTTP server.
pub struct DepotServer {
    config: ServerConfig,
    storage: Arc<dyn Storage>,
}

impl DepotServer {
    /// Open the configured backend. For SQLite this creates the data
    /// directory and runs migrations.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let storage = open_storage(&config)?;
        Ok(Self { config, storage })
    }

    /// Serve an already-constructed storage.
    pub fn with_storage(config: ServerConfig, storage: Arc<dyn Storage>) -> Self {
        Self { config, storage }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.storage.clone()), self.config.body_limit())
    }

    /// Serve until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, backend = ?self.config.backend, "depot server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

fn open_storage(config: &ServerConfig) -> ServerResult<Arc<dyn Storage>> {
    let limits = config.depot.limits;
    let storage: Arc<dyn Storage> = match config.backend {
        BackendKind::Memory => Arc::new(Depot::memory().with_limits(limits)),
        BackendKind::Sqlite => {
            info!(data_dir = %config.depot.data_dir.display(), "opening sqlite depot");
            Arc::new(Depot::open(&config.depot)?)
        }
    };
    Ok(storage)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
