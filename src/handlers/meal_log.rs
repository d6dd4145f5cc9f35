use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::Validate;

use super::{validation_error, AppState};
use crate::extract::{extract, ExtractError};
use crate::models::{GenerateRequest, MealLogRequest};
use crate::prompts;
use crate::variant::{select_model, UseCase};

fn log_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "log_data": null, "message": message })),
    )
        .into_response()
}

/// POST /generate-meal-log-from-text
///
/// Two model round-trips: a strict yes/no validation gate on a fixed
/// model variant, then structured extraction.
pub async fn generate_meal_log(
    State(state): State<AppState>,
    Json(request): Json<MealLogRequest>,
) -> Response {
    if let Err(errors) = request.validate() {
        return validation_error(&errors);
    }

    let validation_model = state
        .config
        .gemini
        .model_id(select_model(UseCase::MealLogValidation, request.is_pro, 0));
    let validation_prompt = prompts::meal_log_validation_prompt(&request.meal_description);

    let validation_reply = match state
        .model
        .generate(&GenerateRequest::text(validation_model, validation_prompt))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Meal log validation call failed: {}", e);
            return log_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Internal error: {e}"),
            );
        }
    };

    let is_valid = validation_reply
        .text()
        .is_some_and(|text| text.trim().eq_ignore_ascii_case("yes"));
    if !is_valid {
        return log_failure(
            StatusCode::OK,
            "Could not detect a valid meal description. Please try again with more detail.",
        );
    }

    let generation_model = state
        .config
        .gemini
        .model_id(select_model(UseCase::MealLogGeneration, request.is_pro, 0));
    let generation_prompt = prompts::meal_log_generation_prompt(&request);

    let reply = match state
        .model
        .generate(&GenerateRequest::text(generation_model, generation_prompt))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Meal log generation call failed: {}", e);
            return log_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Internal error: {e}"),
            );
        }
    };

    let Some(text) = reply.text() else {
        return log_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "model returned an empty reply",
        );
    };

    match extract(&text) {
        Ok(log_data) => (StatusCode::OK, Json(json!({ "log_data": log_data }))).into_response(),
        Err(ExtractError::ExplicitlyInvalid) => {
            log_failure(StatusCode::OK, "Unable to detect a valid meal log.")
        }
        Err(e) => {
            tracing::warn!("Meal log reply was not extractable: {}", e);
            log_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to parse AI response. Try again.",
            )
        }
    }
}
