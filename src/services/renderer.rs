// src/services/renderer.rs

//! Page rendering.
//!
//! Results pages are produced by a browser. The capture only needs the
//! rendered HTML of a URL, optionally after a structural element has
//! appeared, so the browser is reduced to the [`PageRenderer`] capability.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{RendererKind, ScraperConfig};
use crate::utils::http::{create_async_client, fetch_text};

/// Produces the rendered HTML of a page.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `url`, waiting up to the configured timeout for `wait_for`
    /// (a CSS selector) when given.
    async fn render(&self, url: &str, wait_for: Option<&str>) -> Result<String>;
}

/// Fetches server-rendered HTML with a plain GET.
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str, _wait_for: Option<&str>) -> Result<String> {
        fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::render(url, e))
    }
}

/// Renders pages in headless Chrome through a Browserless `/content` endpoint.
pub struct BrowserlessRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    wait_timeout: Duration,
}

impl BrowserlessRenderer {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        token: Option<&str>,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            wait_timeout,
        }
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    fn request_body(&self, url: &str, wait_for: Option<&str>) -> serde_json::Value {
        let mut body = json!({
            "url": url,
            "gotoOptions": { "waitUntil": "networkidle2" },
        });
        if let Some(selector) = wait_for {
            body["waitForSelector"] = json!({
                "selector": selector,
                "timeout": self.wait_timeout.as_millis() as u64,
            });
        }
        body
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str, wait_for: Option<&str>) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(url, wait_for))
            .send()
            .await
            .map_err(|e| AppError::render(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::render(
                url,
                format!("browserless returned {}: {}", status.as_u16(), message),
            ));
        }

        resp.text().await.map_err(|e| AppError::render(url, e))
    }
}

/// Build the renderer selected by the `[scraper]` config section.
pub fn renderer_from_config(config: &ScraperConfig) -> Result<Box<dyn PageRenderer>> {
    let client = create_async_client(config)?;
    match config.renderer {
        RendererKind::Http => Ok(Box::new(HttpRenderer::new(client))),
        RendererKind::Browserless => {
            let base_url = config.browserless_url.as_deref().ok_or_else(|| {
                AppError::config("scraper.browserless_url is required for the browserless renderer")
            })?;
            log::info!("Rendering pages through Browserless at {}", base_url);
            Ok(Box::new(BrowserlessRenderer::new(
                client,
                base_url,
                config.browserless_token.as_deref(),
                Duration::from_millis(config.wait_timeout_ms),
            )))
        }
    }
}
