//! AWS S3 blob store.
//!
//! Objects are written under their key at the bucket root and addressed by
//! their public path-style URL.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::storage::BlobStore;

/// S3-based blob store.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    region: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store.
    pub fn new(client: Client, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    /// Create the store with credentials from the environment.
    pub async fn from_env(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()))
            .load()
            .await;
        Self::new(Client::new(&config), bucket, region)
    }

    /// Public URL of an object.
    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.region, &self.bucket, key)
    }
}

/// Path-style object URL: `https://s3-{region}.amazonaws.com/{bucket}/{key}`.
pub fn object_url(region: &str, bucket: &str, key: &str) -> String {
    format!("https://s3-{}.amazonaws.com/{}/{}", region, bucket, key)
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::storage(format!("put s3://{}/{}: {}", self.bucket, key, e)))?;

        log::info!("Wrote {} bytes to s3://{}/{}", size, self.bucket, key);
        Ok(self.object_url(key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::storage(e.to_string()))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("No object at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::storage(service_err))
                }
            }
        }
    }
}
