use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use super::{router, AppState};
use crate::assets::AssetPipeline;
use crate::config::Config;
use crate::error::{NutrigenError, Result};
use crate::ingredient_api::IngredientImageApi;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::storage::ObjectStore;
use crate::transport::ModelTransport;

// Scripted model transport: replies are popped in reverse order.
struct MockModel {
    responses: Mutex<Vec<GenerateResponse>>,
    calls: AtomicUsize,
}

impl MockModel {
    fn new(responses: Vec<GenerateResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModelTransport for MockModel {
    async fn generate(&self, _req: &GenerateRequest) -> Result<GenerateResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self
            .responses
            .lock()
            .expect("Mock transport mutex should not be poisoned");
        responses
            .pop()
            .ok_or_else(|| NutrigenError::ModelCall("No more mock responses".to_string()))
    }
}

struct MockStore {
    existing: Vec<String>,
}

#[async_trait]
impl ObjectStore for MockStore {
    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!("https://store.test/{bucket}/{object}")
    }

    async fn exists(&self, _bucket: &str, object: &str) -> Result<bool> {
        Ok(self.existing.iter().any(|o| o == object))
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        Ok(self.public_url(bucket, object))
    }
}

struct MissIngredientApi;

#[async_trait]
impl IngredientImageApi for MissIngredientApi {
    async fn find_image(&self, _ingredient_name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn download(&self, _url: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

fn text_response(text: &str) -> GenerateResponse {
    serde_json::from_value(json!({
        "candidates": [{ "content": { "parts": [ {"text": text} ] } }]
    }))
    .unwrap()
}

fn state_with(
    responses: Vec<GenerateResponse>,
    existing_objects: &[&str],
) -> (AppState, Arc<MockModel>) {
    let config = Arc::new(Config::default());
    let model = Arc::new(MockModel::new(responses));
    let store = Arc::new(MockStore {
        existing: existing_objects.iter().map(|s| s.to_string()).collect(),
    });
    let assets = Arc::new(AssetPipeline::new(
        model.clone(),
        store,
        Arc::new(MissIngredientApi),
        &config,
    ));
    (AppState::new(config, model.clone(), assets), model)
}

async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, request).await
}

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(state, request).await
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn meal_plan_body() -> Value {
    json!({
        "meal_goal": "weight loss",
        "region": "Italy",
        "activity_level": "moderately active",
        "age": 33,
        "gender": "female",
        "portion_size": "balanced",
        "cooking_experience": "intermediate",
        "eating_frequency": "three_meals"
    })
}

#[tokio::test]
async fn generate_meals_returns_parsed_plan() {
    let reply = "```json\n[{\"meal\": \"Breakfast\", \"name\": \"Oatmeal\"}, {\"meal\": \"Dinner\", \"name\": \"Salmon\"}]\n```";
    let (state, _) = state_with(vec![text_response(reply)], &[]);

    let (status, body) = post_json(state, "/generate-meals", meal_plan_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meals"].as_array().unwrap().len(), 2);
    assert_eq!(body["meals"][0]["name"], "Oatmeal");
}

#[tokio::test]
async fn generate_meals_parse_failure_is_not_a_server_error() {
    let (state, _) = state_with(vec![text_response("I will not produce JSON today.")], &[]);

    let (status, body) = post_json(state, "/generate-meals", meal_plan_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap().contains("Failed to parse"));
}

#[tokio::test]
async fn generate_meals_model_failure_is_a_server_error() {
    let (state, _) = state_with(vec![], &[]);

    let (status, body) = post_json(state, "/generate-meals", meal_plan_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn meal_plan_rejects_zero_age_before_any_model_call() {
    let mut body = meal_plan_body();
    body["age"] = json!(0);
    let (state, model) = state_with(vec![text_response("unused")], &[]);

    let (status, _) = post_json(state, "/generate-meals", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn meal_log_validation_gate_rejects_without_generation() {
    let (state, model) = state_with(vec![text_response("no")], &[]);

    let (status, body) = post_json(
        state,
        "/generate-meal-log-from-text",
        json!({"meal_description": "asdf qwerty"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["log_data"].is_null());
    assert!(body["message"].as_str().unwrap().contains("valid meal description"));
    // only the validation round-trip ran
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn meal_log_invalid_sentinel_maps_to_clean_message() {
    // popped in reverse order: validation first, then generation
    let (state, _) = state_with(
        vec![text_response("```json\n\"INVALID\"\n```"), text_response("yes")],
        &[],
    );

    let (status, body) = post_json(
        state,
        "/generate-meal-log-from-text",
        json!({"meal_description": "two eggs and toast"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["log_data"].is_null());
    assert!(body["message"].as_str().unwrap().contains("valid meal log"));
}

#[tokio::test]
async fn meal_log_happy_path_returns_log_data() {
    let log = r#"```json
{"name": "Eggs and Toast", "calories": 420}
```"#;
    let (state, _) = state_with(vec![text_response(log), text_response("Yes")], &[]);

    let (status, body) = post_json(
        state,
        "/generate-meal-log-from-text",
        json!({"meal_description": "two eggs and toast"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["log_data"]["name"], "Eggs and Toast");
}

#[tokio::test]
async fn meal_log_parse_failure_is_a_server_error() {
    let (state, _) = state_with(
        vec![text_response("no json here"), text_response("yes")],
        &[],
    );

    let (status, body) = post_json(
        state,
        "/generate-meal-log-from-text",
        json!({"meal_description": "two eggs and toast"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["log_data"].is_null());
}

#[tokio::test]
async fn recipe_requires_at_least_one_ingredient() {
    let (state, model) = state_with(vec![text_response("unused")], &[]);

    let (status, _) = post_json(
        state,
        "/generate-recipe-from-leftovers",
        json!({"ingredients": []}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recipe_happy_path_returns_recipe() {
    let reply = r#"{"name": "Zucchini Omelette", "calories": 350}"#;
    let (state, _) = state_with(vec![text_response(reply)], &[]);

    let (status, body) = post_json(
        state,
        "/generate-recipe-from-leftovers",
        json!({"ingredients": ["zucchini", "eggs"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipe"]["name"], "Zucchini Omelette");
}

#[tokio::test]
async fn recipe_parse_failure_returns_null_recipe() {
    let (state, _) = state_with(vec![text_response("no json")], &[]);

    let (status, body) = post_json(
        state,
        "/generate-recipe-from-leftovers",
        json!({"ingredients": ["zucchini"]}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["recipe"].is_null());
    assert!(body["message"].is_string());
}

// a four-byte JPEG header, base64-encoded
const JPEG_B64: &str = "/9j/4A==";

#[tokio::test]
async fn analyze_image_without_json_span_is_invalid_input_not_500() {
    let (state, _) = state_with(
        vec![text_response("I only see a desk and a keyboard here.")],
        &[],
    );

    let (status, body) = post_json(
        state,
        "/analyze-image",
        json!({"image_base64": JPEG_B64}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invalid_input"], json!(true));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn analyze_image_missing_name_is_invalid_input() {
    let reply = r#"{"meal_data": {"calories": 400}, "description": "a plate"}"#;
    let (state, _) = state_with(vec![text_response(reply)], &[]);

    let (status, body) = post_json(
        state,
        "/analyze-image",
        json!({"image_base64": JPEG_B64}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invalid_input"], json!(true));
}

#[tokio::test]
async fn analyze_image_happy_path_returns_parsed_object() {
    let reply = r#"```json
{"meal_data": {"name": "Club Sandwich", "calories": 480}, "description": "A stacked sandwich."}
```"#;
    let (state, _) = state_with(vec![text_response(reply)], &[]);

    let (status, body) = post_json(
        state,
        "/analyze-image",
        json!({"image_base64": JPEG_B64}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meal_data"]["name"], "Club Sandwich");
    assert_eq!(body["description"], "A stacked sandwich.");
}

#[tokio::test]
async fn analyze_image_rejects_bad_base64() {
    let (state, model) = state_with(vec![text_response("unused")], &[]);

    let (status, _) = post_json(
        state,
        "/analyze-image",
        json!({"image_base64": "not base64!!"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn meal_image_store_hit_returns_cached_url() {
    let (state, model) = state_with(vec![], &["grilled_chicken.png"]);

    let (status, body) = get(state, "/generate-meal-image?meal_name=Grilled%20Chicken").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["image_url"],
        "https://store.test/meal_images/grilled_chicken.png"
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn meal_image_generation_failure_returns_detail() {
    // store miss and no scripted model reply: the generation tier fails
    let (state, _) = state_with(vec![], &[]);

    let (status, body) = get(state, "/generate-meal-image?meal_name=Grilled%20Chicken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());
}
