use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use validator::Validate;

use super::{validation_error, AppState};
use crate::extract::{extract, require_field, ExtractError};
use crate::models::{AnalyzeImageRequest, GenerateRequest};
use crate::prompts;
use crate::variant::{select_model, UseCase};

fn invalid_input(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "error": message, "invalid_input": true })),
    )
        .into_response()
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else if bytes.starts_with(b"RIFF") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// POST /analyze-image
pub async fn analyze_image(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeImageRequest>,
) -> Response {
    if let Err(errors) = request.validate() {
        return validation_error(&errors);
    }

    let bytes = match BASE64.decode(request.image_base64.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("image_base64 is not valid base64: {e}") })),
            )
                .into_response();
        }
    };
    let mime_type = sniff_mime(&bytes);

    let model_id = state
        .config
        .gemini
        .model_id(select_model(UseCase::ImageAnalysis, false, 0));
    tracing::info!(model = model_id, mime_type, "Analyzing meal image");

    let prompt = prompts::image_analysis_prompt();
    let reply = match state
        .model
        .generate(&GenerateRequest::with_inline_image(
            model_id,
            prompt,
            mime_type,
            request.image_base64.trim(),
        ))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Image analysis model call failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Server error: {e}") })),
            )
                .into_response();
        }
    };

    let Some(text) = reply.text() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "model returned an empty reply" })),
        )
            .into_response();
    };

    // A reply without an extractable JSON object is an expected outcome of
    // pointing the model at a non-food image, not a server error.
    match extract(&text) {
        Ok(parsed) => match require_field(&parsed, "meal_data.name") {
            Ok(_) => (StatusCode::OK, Json(parsed)).into_response(),
            Err(ExtractError::MissingField(_)) => {
                invalid_input("Could not confidently identify food in this image.")
            }
            Err(e) => {
                tracing::warn!("Unexpected discriminator failure: {}", e);
                invalid_input("Could not confidently identify food in this image.")
            }
        },
        Err(ExtractError::Parse(_)) | Err(ExtractError::ExplicitlyInvalid) => {
            invalid_input("Unable to detect a valid meal in the image.")
        }
        Err(e) => {
            tracing::warn!("Image analysis reply was not extractable: {}", e);
            invalid_input("Unable to detect a valid meal in the image.")
        }
    }
}
