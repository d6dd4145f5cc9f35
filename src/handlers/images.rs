use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::assets::AssetKind;

#[derive(Debug, Deserialize)]
pub struct MealImageQuery {
    pub meal_name: String,
}

#[derive(Debug, Deserialize)]
pub struct IngredientImageQuery {
    pub ingredient_name: String,
}

async fn resolve(state: &AppState, name: &str, kind: AssetKind) -> Response {
    match state.assets.resolve(name, kind).await {
        Ok(url) => (StatusCode::OK, Json(json!({ "image_url": url }))).into_response(),
        Err(e) => {
            tracing::error!("Asset resolution for '{}' failed: {}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /generate-meal-image?meal_name=
pub async fn generate_meal_image(
    State(state): State<AppState>,
    Query(query): Query<MealImageQuery>,
) -> Response {
    resolve(&state, &query.meal_name, AssetKind::Meal).await
}

/// GET /generate-ingredient-image?ingredient_name=
pub async fn generate_ingredient_image(
    State(state): State<AppState>,
    Query(query): Query<IngredientImageQuery>,
) -> Response {
    resolve(&state, &query.ingredient_name, AssetKind::Ingredient).await
}
