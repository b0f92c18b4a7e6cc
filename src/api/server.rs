//! API Server

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::{
    config::AuditConfig,
    errors::AuditResult,
    games::{SeedConfiguration, SeedHasher, Sha512Hasher},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

/// Verification API server
pub struct ApiServer {
    config: AuditConfig,
    hasher: Arc<dyn SeedHasher>,
    console_seeds: SeedConfiguration,
}

impl ApiServer {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            hasher: Arc::new(Sha512Hasher),
            console_seeds: SeedConfiguration::new("", "", 0, 0),
        }
    }

    /// Swap the hash engine (tests, alternative backends)
    pub fn with_hasher(mut self, hasher: Arc<dyn SeedHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Initial seeds for the shared console session
    pub fn with_console_seeds(mut self, seeds: SeedConfiguration) -> Self {
        self.console_seeds = seeds;
        self
    }

    /// Bind and serve until Ctrl+C / SIGTERM
    pub async fn run(self) -> AuditResult<()> {
        let addr = self.socket_addr()?;
        let app = self.create_app();

        self.log_server_info(&addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Verification API listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped gracefully");
        Ok(())
    }

    /// Router with the full middleware stack
    pub fn create_app(&self) -> axum::Router {
        let state = Arc::new(AppState::new(
            self.hasher.clone(),
            self.config.engine.clone(),
            self.console_seeds.clone(),
        ));

        create_router(state)
            // Request ID middleware (first for tracing)
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(create_cors_layer(self.config.api.allowed_origins.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.api.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    fn socket_addr(&self) -> AuditResult<SocketAddr> {
        let ip = self.config.api.host.parse::<std::net::IpAddr>().map_err(|e| {
            crate::errors::ConfigurationError::InvalidValue {
                field: "api.host".to_string(),
                value: self.config.api.host.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(SocketAddr::from((ip, self.config.api.port)))
    }

    fn log_server_info(&self, addr: &SocketAddr) {
        info!("Server configuration:");
        info!("   Listen: {}", addr);
        info!("   CORS: {:?}", self.config.api.allowed_origins);
        info!("   Request timeout: {}s", self.config.api.request_timeout_secs);
        info!("   Pacing delay: {}ms", self.config.engine.pacing_delay_ms);
        info!("Available endpoints:");
        info!("   GET  /health");
        info!("   POST /api/verify");
        info!("   POST /api/commitment");
        info!("   GET  /api/session");
        info!("   PUT  /api/session/seeds");
        info!("   POST /api/session/rotate");
        info!("   POST /api/session/run");
        info!("   GET  /api/session/log");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
