//! Run configuration, read from `racing.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{PageSelectors, PositionCodes};

/// Every tunable of a capture run. All sections are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page fetching and rendering behavior
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Delays between page visits and image downloads
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Structural selectors for listing and detail pages
    #[serde(default)]
    pub selectors: PageSelectors,

    /// Abnormal-finish position codes
    #[serde(default)]
    pub positions: PositionCodes,

    /// Blob and table store locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse a config file, falling back to the built-in defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "No usable config at {:?} ({}), running with defaults",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Reject settings a run cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.full_result_label.trim().is_empty() {
            return Err(AppError::validation("scraper.full_result_label is empty"));
        }
        if self.scraper.renderer == RendererKind::Browserless
            && self.scraper.browserless_url.is_none()
        {
            return Err(AppError::validation(
                "scraper.browserless_url is required for the browserless renderer",
            ));
        }
        if self.pacing.page_min_secs > self.pacing.page_max_secs {
            return Err(AppError::validation(
                "pacing.page_min_secs must not exceed pacing.page_max_secs",
            ));
        }
        if self.pacing.image_min_secs > self.pacing.image_max_secs {
            return Err(AppError::validation(
                "pacing.image_min_secs must not exceed pacing.image_max_secs",
            ));
        }
        Ok(())
    }
}

/// Which collaborator renders pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain HTTP GET of the server-rendered page
    #[default]
    Http,
    /// Headless Chrome behind a Browserless `/content` endpoint
    Browserless,
}

/// Page fetching and rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Sent with page, Browserless and image requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout, seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub renderer: RendererKind,

    /// Browserless base URL (e.g. `http://localhost:3000`)
    #[serde(default)]
    pub browserless_url: Option<String>,

    #[serde(default)]
    pub browserless_token: Option<String>,

    /// How long the renderer waits for the page's anchor element
    #[serde(default = "defaults::wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Extra render attempts when a detail page comes back without its anchors
    #[serde(default = "defaults::anchor_retries")]
    pub anchor_retries: u32,

    /// Link text of the "open full result" control on the listing page
    #[serde(default = "defaults::full_result_label")]
    pub full_result_label: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            renderer: RendererKind::default(),
            browserless_url: None,
            browserless_token: None,
            wait_timeout_ms: defaults::wait_timeout(),
            anchor_retries: defaults::anchor_retries(),
            full_result_label: defaults::full_result_label(),
        }
    }
}

/// Random delay ranges, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "defaults::page_min")]
    pub page_min_secs: u64,

    #[serde(default = "defaults::page_max")]
    pub page_max_secs: u64,

    #[serde(default = "defaults::image_min")]
    pub image_min_secs: u64,

    #[serde(default = "defaults::image_max")]
    pub image_max_secs: u64,
}

impl PacingConfig {
    /// Delay range between detail page visits.
    pub fn page_range(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.page_min_secs),
            Duration::from_secs(self.page_max_secs),
        )
    }

    /// Delay range between races while downloading silks.
    pub fn image_range(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.image_min_secs),
            Duration::from_secs(self.image_max_secs),
        )
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_min_secs: defaults::page_min(),
            page_max_secs: defaults::page_max(),
            image_min_secs: defaults::image_min(),
            image_max_secs: defaults::image_max(),
        }
    }
}

/// Blob and table store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the local table files
    #[serde(default = "defaults::tables_dir")]
    pub tables_dir: String,

    /// Directory acting as the local blob store
    #[serde(default = "defaults::blob_dir")]
    pub blob_dir: String,

    /// Upload to this S3 bucket instead of the local blob store
    #[serde(default)]
    pub s3_bucket: Option<String>,

    /// Region used to build public object URLs
    #[serde(default = "defaults::s3_region")]
    pub s3_region: String,

    /// Write tables to PostgreSQL instead of local files
    #[serde(default)]
    pub database_url: Option<String>,

    /// Use the `*_test` tables
    #[serde(default)]
    pub testing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tables_dir: defaults::tables_dir(),
            blob_dir: defaults::blob_dir(),
            s3_bucket: None,
            s3_region: defaults::s3_region(),
            database_url: None,
            testing: false,
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; racing-results/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn wait_timeout() -> u64 {
        10_000
    }
    pub fn anchor_retries() -> u32 {
        1
    }
    pub fn full_result_label() -> String {
        "Full result".into()
    }

    pub fn page_min() -> u64 {
        5
    }
    pub fn page_max() -> u64 {
        10
    }
    pub fn image_min() -> u64 {
        1
    }
    pub fn image_max() -> u64 {
        5
    }

    pub fn tables_dir() -> String {
        "storage/tables".into()
    }
    pub fn blob_dir() -> String {
        "storage/blobs".into()
    }
    pub fn s3_region() -> String {
        "eu-west-2".into()
    }
}
