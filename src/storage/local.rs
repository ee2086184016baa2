//! Local filesystem storage implementation.
//!
//! Development and test backends. Production deployments use the S3 blob
//! store and the PostgreSQL table store.
//!
//! ## Storage Layout
//!
//! ```text
//! {blob_root}/
//! ├── raw-data/
//! │   └── 20220221.json
//! └── {race_id}/
//!     └── {silk}.svg
//!
//! {table_root}/
//! ├── race_info.json
//! ├── prize_info.json
//! └── horse_record.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Tables;
use crate::storage::{BlobStore, TableNames, TableStore, WriteMode};

/// Ensure the parent directory of `path` exists.
async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read bytes, returning None if the file doesn't exist.
pub async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root_dir: PathBuf,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        let path = self.path(key);
        write_atomic(&path, &bytes).await?;
        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.path(key)).await
    }
}

/// One JSON array file per table.
#[derive(Debug, Clone)]
pub struct LocalTableStore {
    root_dir: PathBuf,
    names: TableNames,
}

impl LocalTableStore {
    pub fn new(root_dir: impl Into<PathBuf>, names: TableNames) -> Self {
        Self {
            root_dir: root_dir.into(),
            names,
        }
    }

    fn path(&self, table: &str) -> PathBuf {
        self.root_dir.join(format!("{}.json", table))
    }

    async fn read_rows<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        match read_optional(&self.path(table)).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                log::debug!("Table {} not found, starting empty", table);
                Ok(Vec::new())
            }
        }
    }

    async fn write_rows<T: Serialize + DeserializeOwned + Clone>(
        &self,
        table: &str,
        rows: &[T],
        mode: WriteMode,
    ) -> Result<usize> {
        let rows = match mode {
            WriteMode::Replace => rows.to_vec(),
            WriteMode::Append => {
                let mut existing: Vec<T> = self.read_rows(table).await?;
                existing.extend_from_slice(rows);
                existing
            }
        };
        let bytes = serde_json::to_vec_pretty(&rows)?;
        write_atomic(&self.path(table), &bytes).await?;
        Ok(rows.len())
    }
}

#[async_trait]
impl TableStore for LocalTableStore {
    async fn load(&self) -> Result<Tables> {
        Ok(Tables {
            race_info: self.read_rows(&self.names.race_info).await?,
            prize_info: self.read_rows(&self.names.prize_info).await?,
            horse_record: self.read_rows(&self.names.horse_record).await?,
        })
    }

    async fn write(&self, tables: &Tables, mode: WriteMode) -> Result<()> {
        let races = self
            .write_rows(&self.names.race_info, &tables.race_info, mode)
            .await?;
        let prizes = self
            .write_rows(&self.names.prize_info, &tables.prize_info, mode)
            .await?;
        let horses = self
            .write_rows(&self.names.horse_record, &tables.horse_record, mode)
            .await?;
        log::info!(
            "Tables written ({:?}) to {}: {} races, {} prizes, {} horses",
            mode,
            self.root_dir.display(),
            races,
            prizes,
            horses
        );
        Ok(())
    }
}
