// src/error.rs

//! Unified error handling for the results capture.

use std::fmt;

use thiserror::Error;

/// Shorthand used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

/// Everything that can go wrong while capturing and publishing races.
#[derive(Error, Debug)]
pub enum AppError {
    /// Local file access (document, table files, silks)
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Raw data document or table file (de)serialization
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Bad URL: {0}")]
    Url(#[from] url::ParseError),

    /// A configured CSS selector does not parse
    #[error("Selector '{selector}' rejected: {message}")]
    Selector { selector: String, message: String },

    #[error("Config: {0}")]
    Config(String),

    /// Rejected input such as a listing URL without a web scheme
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A structural element every results page must carry was not found
    #[error("Missing '{anchor}' on {url}")]
    MissingAnchor { url: String, anchor: String },

    /// The page could not be opened or rendered
    #[error("Render error for {url}: {message}")]
    Render { url: String, message: String },

    /// Image retrieval failed
    #[error("Image error for {url}: {message}")]
    Image { url: String, message: String },

    /// Blob or table backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Selector that failed to parse, with the parser's message.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// `anchor` names the missing structure, e.g. "horse table".
    pub fn missing_anchor(url: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self::MissingAnchor {
            url: url.into(),
            anchor: anchor.into(),
        }
    }

    pub fn render(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Render {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn image(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Image {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }
}
