// src/storage/document.rs

//! Raw data document: the captured race sequence as one JSON file.

use std::path::Path;

use crate::error::Result;
use crate::models::RaceRecord;
use crate::storage::local::{read_optional, write_atomic};

/// Write races as a pretty-printed JSON array, creating parent directories.
pub async fn save_document(path: &Path, races: &[RaceRecord]) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec_pretty(races)?;
    write_atomic(path, &bytes).await?;
    log::info!("Saved {} races to {}", races.len(), path.display());
    Ok(bytes)
}

/// Load a previously saved document, `None` when the file does not exist.
pub async fn load_document(path: &Path) -> Result<Option<Vec<RaceRecord>>> {
    match read_optional(path).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}
