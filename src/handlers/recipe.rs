use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::Validate;

use super::{validation_error, AppState};
use crate::extract::extract;
use crate::models::{GenerateRequest, RecipeRequest};
use crate::prompts;
use crate::variant::{select_model, UseCase};

fn recipe_failure(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "recipe": null, "message": message })),
    )
        .into_response()
}

/// POST /generate-recipe-from-leftovers
pub async fn generate_recipe(
    State(state): State<AppState>,
    Json(request): Json<RecipeRequest>,
) -> Response {
    if let Err(errors) = request.validate() {
        return validation_error(&errors);
    }

    let variant = select_model(UseCase::Recipe, request.is_pro, 0);
    let model_id = state.config.gemini.model_id(variant);
    tracing::info!(
        model = model_id,
        ingredients = request.ingredients.len(),
        "Generating recipe from leftovers"
    );

    let prompt = prompts::recipe_prompt(&request);
    let reply = match state
        .model
        .generate(&GenerateRequest::text(model_id, prompt))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Recipe model call failed: {}", e);
            return recipe_failure(format!("Internal server error: {e}"));
        }
    };

    let Some(text) = reply.text() else {
        return recipe_failure("model returned an empty reply".to_string());
    };

    match extract(&text) {
        Ok(recipe) => (StatusCode::OK, Json(json!({ "recipe": recipe }))).into_response(),
        Err(e) => {
            tracing::warn!("Recipe reply was not extractable: {}", e);
            recipe_failure("Failed to parse model response.".to_string())
        }
    }
}
