use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::Validate;

use super::{validation_error, AppState};
use crate::extract::{extract, ExtractError};
use crate::models::{GenerateRequest, MealPlanRequest};
use crate::prompts;
use crate::variant::{select_model, UseCase};

/// POST /generate-meals
pub async fn generate_meals(
    State(state): State<AppState>,
    Json(mut request): Json<MealPlanRequest>,
) -> Response {
    if let Err(errors) = request.validate() {
        return validation_error(&errors);
    }

    // meal_count is derived, never client-supplied
    request.apply_meal_count();

    let variant = select_model(UseCase::MealPlan, request.is_pro, request.regenerate_count);
    let model_id = state.config.gemini.model_id(variant);
    tracing::info!(
        model = model_id,
        regenerate_count = request.regenerate_count,
        meal_count = request.meal_count,
        "Generating meal plan"
    );

    let prompt = prompts::meal_plan_prompt(&request);
    let reply = match state
        .model
        .generate(&GenerateRequest::text(model_id, prompt))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Meal plan model call failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
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

    match extract(&text) {
        Ok(meals) => (StatusCode::OK, Json(json!({ "meals": meals }))).into_response(),
        Err(ExtractError::Parse(e)) => {
            tracing::warn!("Meal plan reply was not valid JSON: {}", e);
            (
                StatusCode::OK,
                Json(json!({
                    "error": "Failed to parse AI response. Ensure model outputs valid JSON."
                })),
            )
                .into_response()
        }
        Err(other) => (
            StatusCode::OK,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}
