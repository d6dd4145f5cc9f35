use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::SpoonacularConfig;
use crate::error::Result;

const SEARCH_URL: &str = "https://api.spoonacular.com/food/ingredients/search";
const CDN_BASE: &str = "https://spoonacular.com/cdn/ingredients_100x100";

/// Third-party ingredient-image lookup. `find_image` yields a candidate
/// URL; only a successful `download` makes it a real hit, so an API hit
/// with a dead image link degrades to the next tier.
#[async_trait]
pub trait IngredientImageApi: Send + Sync {
    /// Search for an ingredient image and return the candidate CDN URL.
    async fn find_image(&self, ingredient_name: &str) -> Result<Option<String>>;

    /// Fetch the image bytes, verifying the link resolves. Failure is a
    /// miss (`None`), not an error.
    async fn download(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
}

pub struct SpoonacularClient {
    client: Client,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(config: &SpoonacularConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
        }
    }

    fn cdn_url(ingredient_name: &str) -> String {
        let file_name = ingredient_name.to_lowercase().replace(' ', "-");
        format!("{CDN_BASE}/{file_name}.jpg")
    }
}

#[async_trait]
impl IngredientImageApi for SpoonacularClient {
    async fn find_image(&self, ingredient_name: &str) -> Result<Option<String>> {
        let response = match self
            .client
            .get(SEARCH_URL)
            .query(&[("query", ingredient_name), ("apiKey", &self.api_key)])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(
                    "Spoonacular search for '{}' answered {}",
                    ingredient_name,
                    response.status()
                );
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("Spoonacular search for '{}' failed: {}", ingredient_name, e);
                return Ok(None);
            }
        };

        let data: SearchResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Spoonacular search reply was not JSON: {}", e);
                return Ok(None);
            }
        };

        Ok(data.results.first().map(|first| Self::cdn_url(&first.name)))
    }

    async fn download(&self, url: &str) -> Result<Option<Vec<u8>>> {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) => Ok(Some(bytes.to_vec())),
                Err(e) => {
                    tracing::warn!("Error reading image body from {}: {}", url, e);
                    Ok(None)
                }
            },
            Ok(response) => {
                tracing::warn!("Image download from {} answered {}", url, response.status());
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Error downloading image from {}: {}", url, e);
                Ok(None)
            }
        }
    }
}
