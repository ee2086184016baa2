// src/services/images.rs

//! Silk image retrieval.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::utils::http::fetch_bytes;

/// Given a URL, produce the image bytes or fail.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = fetch_bytes(&self.client, url)
            .await
            .map_err(|e| AppError::image(url, e))?;
        if bytes.is_empty() {
            return Err(AppError::image(url, "empty response body"));
        }
        Ok(bytes)
    }
}
