use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::variant::ModelVariant;

/// Main configuration structure for the nutrigen service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub storage: StorageConfig,
    pub spoonacular: SpoonacularConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model_fast: String,
    pub model_premium: String,
    pub model_thinking: String,
    pub model_validation: String,
    pub model_image: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
    pub meal_bucket: String,
    pub ingredient_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoonacularConfig {
    pub api_key: String,
}

impl GeminiConfig {
    /// Resolve a model variant to the configured model identifier.
    pub fn model_id(&self, variant: ModelVariant) -> &str {
        match variant {
            ModelVariant::Fast => &self.model_fast,
            ModelVariant::Premium => &self.model_premium,
            ModelVariant::Thinking => &self.model_thinking,
            ModelVariant::Validation => &self.model_validation,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("NUTRIGEN_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("NUTRIGEN_BIND") {
            self.server.bind = bind;
        }

        // Gemini overrides
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Ok(model) = env::var("GEMINI_MODEL_FAST") {
            self.gemini.model_fast = model;
        }
        if let Ok(model) = env::var("GEMINI_MODEL_PREMIUM") {
            self.gemini.model_premium = model;
        }
        if let Ok(model) = env::var("GEMINI_MODEL_THINKING") {
            self.gemini.model_thinking = model;
        }
        if let Ok(model) = env::var("GEMINI_MODEL_VALIDATION") {
            self.gemini.model_validation = model;
        }
        if let Ok(model) = env::var("GEMINI_MODEL_IMAGE") {
            self.gemini.model_image = model;
        }
        if let Ok(timeout) = env::var("GEMINI_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.request_timeout_seconds = secs;
            }
        }

        // Object store overrides
        if let Ok(url) = env::var("SUPABASE_URL") {
            self.storage.base_url = url;
        }
        if let Ok(key) = env::var("SUPABASE_KEY") {
            self.storage.service_key = key;
        }
        if let Ok(bucket) = env::var("NUTRIGEN_MEAL_BUCKET") {
            self.storage.meal_bucket = bucket;
        }
        if let Ok(bucket) = env::var("NUTRIGEN_INGREDIENT_BUCKET") {
            self.storage.ingredient_bucket = bucket;
        }

        if let Ok(api_key) = env::var("SPOONACULAR_API_KEY") {
            self.spoonacular.api_key = api_key;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid bind address: {}", self.server.bind).into());
        }

        if self.gemini.api_key.is_empty() || self.gemini.api_key == "PLACEHOLDER_GEMINI_API_KEY" {
            return Err("GEMINI_API_KEY environment variable must be set".into());
        }
        if self.gemini.request_timeout_seconds == 0 {
            return Err("Gemini request timeout cannot be 0".into());
        }

        if self.storage.base_url.is_empty() {
            return Err("SUPABASE_URL environment variable must be set".into());
        }
        if self.storage.service_key.is_empty() {
            return Err("SUPABASE_KEY environment variable must be set".into());
        }

        if self.spoonacular.api_key.is_empty() {
            return Err("SPOONACULAR_API_KEY environment variable must be set".into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0:8000".to_string(),
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
                    tracing::warn!("GEMINI_API_KEY not set, using placeholder");
                    "PLACEHOLDER_GEMINI_API_KEY".to_string()
                }),
                model_fast: "gemini-2.5-flash-preview-04-17-thinking".to_string(),
                model_premium: "gemini-2.5-pro-preview-03-25".to_string(),
                model_thinking: "gemini-2.5-flash-preview-04-17-thinking".to_string(),
                model_validation: "gemini-1.5-pro".to_string(),
                model_image: "gemini-2.0-flash-exp-image-generation".to_string(),
                request_timeout_seconds: 120,
            },
            storage: StorageConfig {
                base_url: env::var("SUPABASE_URL").unwrap_or_default(),
                service_key: env::var("SUPABASE_KEY").unwrap_or_default(),
                meal_bucket: "meal_images".to_string(),
                ingredient_bucket: "ingredients".to_string(),
            },
            spoonacular: SpoonacularConfig {
                api_key: env::var("SPOONACULAR_API_KEY").unwrap_or_default(),
            },
        }
    }
}
