use super::status_of;
use crate::models::{LunarConversion, LunarDate, UserInfo};
use crate::services::providers::{generate_with_deadline, ImageAttachment};
use crate::services::{calendar, metrics, prompts, StagedUpload};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

const SUBMIT_FAILURE: &str = "Đã xảy ra lỗi khi xử lý yêu cầu";

/// Multipart field carrying the chart image.
pub const IMAGE_FIELD: &str = "tuviImage";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub message: String,
    /// Model output, passed through verbatim.
    pub analysis: String,
    pub lunar_date: String,
    pub solar_date: String,
    pub birth_time: String,
    pub name: String,
}

struct UploadedImage {
    file_name: Option<String>,
    mime_type: String,
    bytes: Bytes,
}

#[derive(Default)]
struct ChartForm {
    name: Option<String>,
    birth_date: Option<String>,
    birth_time: Option<String>,
    images: Vec<UploadedImage>,
}

/// `POST /submit` (multipart: `name`, `birthDate`, `birthTime`, `tuviImage`)
#[tracing::instrument(skip(state, multipart))]
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let result = handle_submission(&state, multipart).await;
    metrics::record_request("submit", status_of(&result));
    result.map(Json)
}

async fn handle_submission(
    state: &AppState,
    multipart: Multipart,
) -> Result<SubmitResponse, AppError> {
    let mut form = read_form(multipart).await?;

    let image = match form.images.len() {
        0 => return Err(AppError::bad_request("No image uploaded")),
        1 => form.images.remove(0),
        _ => return Err(AppError::bad_request("Only one image can be uploaded")),
    };

    let user = UserInfo {
        name: required(form.name, "name")?,
        birth_date: required(form.birth_date, "birthDate")?,
        birth_time: required(form.birth_time, "birthTime")?,
    };

    let staged = state
        .staging
        .stage(&image.bytes, image.file_name.as_deref(), &image.mime_type)
        .await
        .map_err(|e| AppError::upstream(SUBMIT_FAILURE, e))?;
    drop(image);

    let outcome = analyze_chart(state, &user, &staged).await;
    staged.discard().await;
    let (analysis, lunar) = outcome?;

    Ok(SubmitResponse {
        message: "Success".to_string(),
        analysis,
        lunar_date: lunar.to_string(),
        solar_date: user.birth_date,
        birth_time: user.birth_time,
        name: user.name,
    })
}

async fn analyze_chart(
    state: &AppState,
    user: &UserInfo,
    staged: &StagedUpload,
) -> Result<(String, LunarDate), AppError> {
    let conversion = calendar::solar_to_lunar(&user.birth_date);
    if let LunarConversion::Fallback { reason, .. } = conversion {
        metrics::record_lunar_fallback();
        tracing::warn!(
            birth_date = %user.birth_date,
            reason = %reason,
            "Lunar conversion fell back to the solar date"
        );
    }
    let lunar = conversion.lunar();

    let prompt = prompts::compose_chart_analysis_prompt(user, &lunar);
    let image = ImageAttachment {
        bytes: staged
            .read()
            .await
            .map_err(|e| AppError::upstream(SUBMIT_FAILURE, e))?,
        mime_type: staged.mime_type().to_string(),
    };

    tracing::info!(
        lunar_date = %lunar,
        image_bytes = image.bytes.len(),
        mime_type = %image.mime_type,
        "Analyzing chart"
    );

    let response = generate_with_deadline(
        state.text_provider.as_ref(),
        "submit",
        &prompt,
        Some(&image),
        state.config.provider.timeout(),
        &state.shutdown,
    )
    .await
    .map_err(|e| AppError::upstream(SUBMIT_FAILURE, e))?;

    Ok((response.text, lunar))
}

async fn read_form(mut multipart: Multipart) -> Result<ChartForm, AppError> {
    let mut form = ChartForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);

        match field_name.as_deref() {
            Some("name") => form.name = Some(field.text().await.map_err(multipart_error)?),
            Some("birthDate") => form.birth_date = Some(field.text().await.map_err(multipart_error)?),
            Some("birthTime") => form.birth_time = Some(field.text().await.map_err(multipart_error)?),
            Some(IMAGE_FIELD) => {
                let file_name = field.file_name().map(str::to_owned);
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty, unnamed part when no file was chosen.
                if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                    continue;
                }

                form.images.push(UploadedImage {
                    file_name,
                    mime_type,
                    bytes,
                });
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::bad_request(format!("Missing required field: {}", field)))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::bad_request(format!("Failed to read multipart field: {}", e.body_text()))
    }
}
