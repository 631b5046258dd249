//! Application startup and lifecycle management.

use crate::config::TuviConfig;
use crate::handlers;
use crate::services::metrics;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::UploadStaging;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for the text fields and multipart framing around the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TuviConfig,
    pub text_provider: Arc<dyn TextProvider>,
    pub staging: Arc<UploadStaging>,
    /// Cancelled on shutdown; aborts in-flight provider calls.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: TuviConfig,
        text_provider: Arc<dyn TextProvider>,
        staging: UploadStaging,
    ) -> Self {
        Self {
            config,
            text_provider,
            staging: Arc::new(staging),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Request body cap for `/submit`: the image limit plus form framing.
fn submit_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

/// Build the HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    let body_limit = submit_body_limit(state.config.storage.max_upload_bytes);
    let static_files = ServeDir::new(&state.config.storage.static_dir);

    Router::new()
        .route("/oracle", get(handlers::oracle))
        .route(
            "/submit",
            post(handlers::submit).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .fallback_service(static_files)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: TuviConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.models.text_model.clone(),
            api_base: config.google.api_base.clone(),
            timeout: config.provider.timeout(),
        };
        let text_provider: Arc<dyn TextProvider> = Arc::new(
            GeminiTextProvider::new(gemini_config)
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
        );

        tracing::info!(
            model = %config.models.text_model,
            "Initialized Gemini text provider"
        );

        Self::build_with_provider(config, text_provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: TuviConfig,
        text_provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        metrics::init_metrics();

        let staging = UploadStaging::new(&config.storage.upload_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to initialize upload staging at {}: {}",
                    config.storage.upload_dir.display(),
                    e
                );
                AppError::from(e)
            })?;

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Tử vi service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, text_provider, staging),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Token that triggers graceful shutdown when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let shutdown = self.state.shutdown.clone();
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await
    }
}

/// Resolve on Ctrl+C, SIGTERM or an explicit cancel, then cancel `token`.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => {},
    }

    tracing::info!("Shutdown signal received");
    token.cancel();
}
