//! HTTP surface: one handler module per use case, wired into an axum
//! router with fully open CORS.

pub mod analyze_image;
pub mod images;
pub mod meal_log;
pub mod meal_plan;
pub mod recipe;

#[cfg(test)]
mod test_handlers;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assets::AssetPipeline;
use crate::config::Config;
use crate::transport::ModelTransport;

/// Shared, request-independent dependencies. Constructed once at startup
/// and injected; handlers hold no other state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<dyn ModelTransport>,
    pub assets: Arc<AssetPipeline>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        model: Arc<dyn ModelTransport>,
        assets: Arc<AssetPipeline>,
    ) -> Self {
        Self {
            config,
            model,
            assets,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-meals", post(meal_plan::generate_meals))
        .route("/generate-meal-image", get(images::generate_meal_image))
        .route(
            "/generate-ingredient-image",
            get(images::generate_ingredient_image),
        )
        .route(
            "/generate-meal-log-from-text",
            post(meal_log::generate_meal_log),
        )
        .route(
            "/generate-recipe-from-leftovers",
            post(recipe::generate_recipe),
        )
        .route("/analyze-image", post(analyze_image::analyze_image))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Malformed inbound requests are rejected before any pipeline logic runs.
pub(crate) fn validation_error(errors: &validator::ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("invalid request: {errors}") })),
    )
        .into_response()
}
