//! Tiered fetch/generate/cache pipeline for meal and ingredient images.
//!
//! Resolution is terminal on first success: object store probe, then the
//! alternate ingredient-image API (ingredients only), then generative
//! image synthesis, with the winning bytes persisted back to the store
//! under a deterministic key. There is no single-flight for concurrent
//! first-time generations of the same name; uploads are upserts at the
//! same key, so the race is last-write-wins.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use crate::config::Config;
use crate::error::{NutrigenError, Result};
use crate::ingredient_api::IngredientImageApi;
use crate::models::GenerateRequest;
use crate::prompts::{ingredient_image_prompt, meal_image_prompt};
use crate::storage::ObjectStore;
use crate::transport::ModelTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Meal,
    Ingredient,
}

/// Normalized, filesystem-safe cache key from a human-readable name.
/// Pure and total: never fails, never branches on locale. The same name
/// always yields the same slug (case-insensitive, accent-stripped,
/// non-word characters stripped, separators collapsed to underscores).
pub fn slug(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for c in lowered.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_sep = true;
        } else if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        }
        // anything else (punctuation, symbols) is stripped
    }
    out
}

/// Deterministic object key for a named asset.
pub fn object_key(name: &str) -> String {
    format!("{}.png", slug(name))
}

pub struct AssetPipeline {
    model: Arc<dyn ModelTransport>,
    store: Arc<dyn ObjectStore>,
    ingredient_api: Arc<dyn IngredientImageApi>,
    image_model: String,
    meal_bucket: String,
    ingredient_bucket: String,
}

impl AssetPipeline {
    pub fn new(
        model: Arc<dyn ModelTransport>,
        store: Arc<dyn ObjectStore>,
        ingredient_api: Arc<dyn IngredientImageApi>,
        config: &Config,
    ) -> Self {
        Self {
            model,
            store,
            ingredient_api,
            image_model: config.gemini.model_image.clone(),
            meal_bucket: config.storage.meal_bucket.clone(),
            ingredient_bucket: config.storage.ingredient_bucket.clone(),
        }
    }

    fn bucket(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Meal => &self.meal_bucket,
            AssetKind::Ingredient => &self.ingredient_bucket,
        }
    }

    /// Resolve a public URL for the named asset, caching on first use.
    /// A second call for the same name short-circuits at the store probe
    /// once the first call's upload has completed.
    pub async fn resolve(&self, name: &str, kind: AssetKind) -> Result<String> {
        let object = object_key(name);
        let bucket = self.bucket(kind);

        if self.store.exists(bucket, &object).await? {
            tracing::debug!("Asset cache hit for {}/{}", bucket, object);
            return Ok(self.store.public_url(bucket, &object));
        }

        if kind == AssetKind::Ingredient {
            if let Some(url) = self.resolve_from_ingredient_api(name, bucket, &object).await? {
                return Ok(url);
            }
        }

        let bytes = self.generate_image(name, kind).await?;
        self.store.upload(bucket, &object, bytes, "image/png").await
    }

    /// Alternate-API tier. `Ok(None)` means miss: dead image link, failed
    /// download, or no search result - the caller advances to generation.
    async fn resolve_from_ingredient_api(
        &self,
        name: &str,
        bucket: &str,
        object: &str,
    ) -> Result<Option<String>> {
        let Some(api_url) = self.ingredient_api.find_image(name).await? else {
            return Ok(None);
        };

        let Some(bytes) = self.ingredient_api.download(&api_url).await? else {
            tracing::warn!("Ingredient image link for '{}' did not resolve", name);
            return Ok(None);
        };

        match self.store.upload(bucket, object, bytes, "image/png").await {
            Ok(stored_url) => Ok(Some(stored_url)),
            Err(e) => {
                // Upload failure is non-fatal here: the alternate API URL
                // still serves the request.
                tracing::warn!("Upload of ingredient image '{}' failed: {}", name, e);
                Ok(Some(api_url))
            }
        }
    }

    async fn generate_image(&self, name: &str, kind: AssetKind) -> Result<Vec<u8>> {
        let prompt = match kind {
            AssetKind::Meal => meal_image_prompt(name),
            AssetKind::Ingredient => ingredient_image_prompt(name),
        };

        let request = GenerateRequest::image_generation(&self.image_model, prompt);
        let response = self.model.generate(&request).await?;

        let inline = response
            .inline_image()
            .ok_or(NutrigenError::AssetGeneration)?;
        BASE64
            .decode(&inline.data)
            .map_err(|_| NutrigenError::AssetGeneration)
    }
}
