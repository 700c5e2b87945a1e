use crate::{
    analysis::ANALYZE_PATH,
    config::{EngineConfig, PosecamConfig, RelayConfig, StagingConfig},
    error::{PosecamError, RelayError, Result},
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::engine::EngineClient;
use super::handlers::{analyze_pose_video_handler, health_handler};
use super::staging::StagingArea;

/// Shared state for the Axum server
#[derive(Clone)]
pub struct RelayState {
    pub(crate) staging: Arc<StagingArea>,
    pub(crate) engine: Arc<EngineClient>,
}

/// HTTP relay between capture clients and the pose engine
pub struct RelayServer {
    pub(crate) config: RelayConfig,
    pub(crate) state: RelayState,
}

impl RelayServer {
    /// Create a new relay server
    pub fn new(
        config: RelayConfig,
        engine_config: &EngineConfig,
        staging_config: &StagingConfig,
    ) -> Result<Self> {
        let engine = EngineClient::new(engine_config)?;
        let staging = StagingArea::new(staging_config);

        Ok(Self {
            config,
            state: RelayState {
                staging: Arc::new(staging),
                engine: Arc::new(engine),
            },
        })
    }

    pub fn from_config(config: &PosecamConfig) -> Result<Self> {
        Self::new(config.relay.clone(), &config.engine, &config.staging)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.ip, self.config.port)
    }

    /// Routes plus body limit and request tracing.
    ///
    /// Oversized uploads surface as multipart errors in the handler.
    pub fn router(&self) -> Router {
        Router::new()
            .route(ANALYZE_PATH, post(analyze_pose_video_handler))
            .route("/health", get(health_handler))
            .layer(DefaultBodyLimit::max(self.config.body_limit_bytes()))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` fires
    pub async fn start(&self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.address();

        info!("Starting pose relay on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RelayError::BindFailed {
                address: addr.clone(),
                source: e,
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        if let Ok(local) = listener.local_addr() {
            info!(
                "Pose relay listening on {} (engine {}, staging {})",
                local,
                self.state.engine.url(),
                self.state.staging.dir().display()
            );
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(|e| RelayError::StartupFailed {
                details: format!("Server error: {}", e),
            })?;

        info!("Pose relay stopped");
        Ok(())
    }
}

/// Relay server builder for configuration
pub struct RelayServerBuilder {
    relay: Option<RelayConfig>,
    engine: Option<EngineConfig>,
    staging: Option<StagingConfig>,
}

impl RelayServerBuilder {
    /// Create a new relay server builder
    pub fn new() -> Self {
        Self {
            relay: None,
            engine: None,
            staging: None,
        }
    }

    /// Set the listener configuration
    pub fn relay(mut self, config: RelayConfig) -> Self {
        self.relay = Some(config);
        self
    }

    /// Set the engine configuration
    pub fn engine(mut self, config: EngineConfig) -> Self {
        self.engine = Some(config);
        self
    }

    /// Set the staging configuration
    pub fn staging(mut self, config: StagingConfig) -> Self {
        self.staging = Some(config);
        self
    }

    /// Build the relay server
    pub fn build(self) -> Result<RelayServer> {
        let relay = self.relay.ok_or_else(|| {
            PosecamError::Relay(RelayError::StartupFailed {
                details: "Relay configuration is required".to_string(),
            })
        })?;

        let engine = self.engine.ok_or_else(|| {
            PosecamError::Relay(RelayError::StartupFailed {
                details: "Engine configuration is required".to_string(),
            })
        })?;

        let staging = self.staging.ok_or_else(|| {
            PosecamError::Relay(RelayError::StartupFailed {
                details: "Staging configuration is required".to_string(),
            })
        })?;

        RelayServer::new(relay, &engine, &staging)
    }
}

impl Default for RelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
