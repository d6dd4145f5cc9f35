use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{NutrigenError, Result};
use crate::models::{GenerateRequest, GenerateResponse};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_ATTEMPTS: u8 = 3;

/// Boundary to the generative model. Handlers and the asset pipeline only
/// see this trait; tests script replies through a mock.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse>;
}

pub struct GeminiTransport {
    client: Client,
    api_key: String,
}

impl GeminiTransport {
    pub fn new(api_key: String, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| NutrigenError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_key })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{GEMINI_API_BASE}/{model}:generateContent")
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let mut attempts = 0;

        while attempts < MAX_ATTEMPTS {
            attempts += 1;

            match self
                .client
                .post(self.endpoint(&req.model))
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(req)
                .send()
                .await
            {
                Ok(response) => {
                    if response.status().is_success() {
                        return response.json().await.map_err(|e| {
                            NutrigenError::ModelCall(format!(
                                "failed to parse Gemini API response: {e}"
                            ))
                        });
                    }

                    if attempts >= MAX_ATTEMPTS {
                        return Err(NutrigenError::ModelCall(format!(
                            "Gemini API error after {} attempts: {}",
                            attempts,
                            response
                                .text()
                                .await
                                .unwrap_or_else(|_| "Unknown error".to_string())
                        )));
                    }
                }
                Err(e) => {
                    if attempts >= MAX_ATTEMPTS {
                        return Err(NutrigenError::ModelCall(format!(
                            "failed to send request to Gemini API after {attempts} attempts: {e}"
                        )));
                    }
                }
            }

            // Exponential backoff with jitter (only if we're going to retry)
            if attempts < MAX_ATTEMPTS {
                let base_delay =
                    Duration::from_millis(200 * 2u64.pow(attempts.saturating_sub(1) as u32));
                let jitter = rand::thread_rng().gen_range(0.8..=1.2);
                let delay = Duration::from_millis((base_delay.as_millis() as f64 * jitter) as u64);
                sleep(delay).await;
            }
        }

        Err(NutrigenError::ModelCall(format!(
            "Gemini API request failed after {MAX_ATTEMPTS} attempts"
        )))
    }
}
