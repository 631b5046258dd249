use super::status_of;
use crate::models::{ReadingPeriod, UserInfo};
use crate::services::providers::generate_with_deadline;
use crate::services::{hexagram, metrics, prompts};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

const ORACLE_FAILURE: &str = "Đã xảy ra lỗi khi xin quẻ";

#[derive(Debug, Deserialize)]
pub struct OracleParams {
    #[serde(rename = "type")]
    pub period: Option<String>,
    /// JSON-encoded [`UserInfo`].
    #[serde(rename = "userInfo")]
    pub user_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OracleResponse {
    /// Trigram glyph.
    pub hexagram: String,
    pub title: String,
    /// Model output, passed through verbatim.
    pub description: String,
}

/// `GET /oracle?type={week|month|year}&userInfo={json}`
#[tracing::instrument(skip(state, params))]
pub async fn oracle(
    State(state): State<AppState>,
    Query(params): Query<OracleParams>,
) -> Result<Json<OracleResponse>, AppError> {
    let result = draw_reading(&state, params).await;
    metrics::record_request("oracle", status_of(&result));
    result.map(Json)
}

async fn draw_reading(state: &AppState, params: OracleParams) -> Result<OracleResponse, AppError> {
    let period = params
        .period
        .as_deref()
        .and_then(|p| p.parse::<ReadingPeriod>().ok())
        .ok_or_else(|| AppError::bad_request("Invalid oracle type"))?;

    let user: UserInfo = params
        .user_info
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .ok_or_else(|| AppError::bad_request("Invalid user info"))?;

    let hexagram = hexagram::select_random();
    tracing::info!(
        period = period.as_str(),
        hexagram = hexagram.name,
        "Drawing reading"
    );

    let prompt = prompts::compose_reading_prompt(&user, hexagram, period);
    let response = generate_with_deadline(
        state.text_provider.as_ref(),
        "oracle",
        &prompt,
        None,
        state.config.provider.timeout(),
        &state.shutdown,
    )
    .await
    .map_err(|e| AppError::upstream(ORACLE_FAILURE, e))?;

    Ok(OracleResponse {
        hexagram: hexagram.symbol.to_string(),
        title: hexagram.title(),
        description: response.text,
    })
}
