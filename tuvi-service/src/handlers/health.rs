use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe; also reports whether the AI provider is usable.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.text_provider.name();
    let provider_error = state.text_provider.health_check().await.err();

    Json(json!({
        "status": "ok",
        "service": "tuvi-service",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": {
            "name": provider,
            "configured": provider_error.is_none(),
            "error": provider_error.map(|e| e.to_string()),
        }
    }))
}

/// Readiness probe: ready once the provider is configured.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.text_provider.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Provider not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
