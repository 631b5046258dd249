use service_core::observability::init_tracing;
use tuvi_service::config::TuviConfig;
use tuvi_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = TuviConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "tuvi-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
