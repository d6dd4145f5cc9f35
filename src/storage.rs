use async_trait::async_trait;
use reqwest::Client;

use crate::config::StorageConfig;
use crate::error::{NutrigenError, Result};

/// Object store boundary: upload by key, public URL by key, existence
/// probe against the public URL convention.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn public_url(&self, bucket: &str, object: &str) -> String;

    /// True when a GET of the public URL answers 200. Any other status is
    /// treated as a miss, not an error.
    async fn exists(&self, bucket: &str, object: &str) -> Result<bool>;

    /// Upload bytes under the deterministic key and return the public URL.
    /// Writes are upserts: the key's content is treated as immutable once
    /// written, so a concurrent duplicate write is last-write-wins.
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}

/// Supabase storage over its REST surface.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, object
        )
    }

    async fn exists(&self, bucket: &str, object: &str) -> Result<bool> {
        let url = self.public_url(bucket, object);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Object store probe failed for {}: {}", url, e);
                Ok(false)
            }
        }
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| NutrigenError::Storage(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(NutrigenError::Storage(format!(
                "upload to {bucket}/{object} failed with {status}: {detail}"
            )));
        }

        Ok(self.public_url(bucket, object))
    }
}
