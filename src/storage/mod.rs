//! Storage abstractions for captured races.
//!
//! Two collaborators persist a capture:
//! - `BlobStore`: key/value objects (raw data file, silk images)
//! - `TableStore`: the three relational tables
//!
//! ## Blob Keys
//!
//! ```text
//! raw-data/{file_name}          # raw data document of one run
//! {race_id}/{image_file_name}   # silk image of a starter
//! ```

pub mod document;
pub mod local;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Tables;

// Re-export for convenience
pub use document::{load_document, save_document};
pub use local::{LocalBlobStore, LocalTableStore};
#[cfg(feature = "postgres")]
pub use postgres::PgTableStore;
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;

/// Trait for key/value object backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL of the stored object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Read an object, `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// How a table write treats existing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep existing rows and add the new ones
    Append,
    /// Drop existing rows and store exactly the given ones
    Replace,
}

/// Trait for relational table backends.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Load all three tables. Missing tables load as empty.
    async fn load(&self) -> Result<Tables>;

    /// Write all three tables with the same mode.
    async fn write(&self, tables: &Tables, mode: WriteMode) -> Result<()>;
}

/// Physical table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub race_info: String,
    pub prize_info: String,
    pub horse_record: String,
}

impl TableNames {
    /// Production names, or the `*_test` set when `testing`.
    pub fn new(testing: bool) -> Self {
        let suffix = if testing { "_test" } else { "" };
        Self {
            race_info: format!("race_info{suffix}"),
            prize_info: format!("prize_info{suffix}"),
            horse_record: format!("horse_record{suffix}"),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Blob key of a run's raw data document.
pub fn raw_data_key(file_name: &str) -> String {
    format!("raw-data/{}", file_name)
}

/// Blob key of a silk image.
pub fn silk_key(race_id: &str, file_name: &str) -> String {
    format!("{}/{}", race_id, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let names = TableNames::new(false);
        assert_eq!(names.race_info, "race_info");
        assert_eq!(names.horse_record, "horse_record");

        let names = TableNames::new(true);
        assert_eq!(names.race_info, "race_info_test");
        assert_eq!(names.prize_info, "prize_info_test");
        assert_eq!(names.horse_record, "horse_record_test");
    }

    #[test]
    fn test_blob_keys() {
        assert_eq!(raw_data_key("20220221.json"), "raw-data/20220221.json");
        assert_eq!(silk_key("4c565f0d", "1234.svg"), "4c565f0d/1234.svg");
    }
}
