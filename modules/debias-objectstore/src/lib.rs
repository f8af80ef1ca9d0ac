//! Object store (C3): content-addressed UTF-8 blob storage for raw HTML artifacts.
//!
//! Keys follow `{target_id}/{url_hash}/{content_hash}.html` (§3); the store itself knows
//! nothing about that layout, it just puts and gets bytes at whatever key it's given.

pub mod error;

pub use error::{ObjectStoreError, Result};

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use debias_common::config::S3Config;
use tracing::debug;

#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub async fn connect(config: &S3Config) -> Self {
        let region = aws_sdk_s3::config::Region::new(config.region.clone());
        let credentials = aws_sdk_s3::config::Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "debias-config",
        );
        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        let client = Client::new(&shared_config);
        Self {
            client,
            bucket: config.bucket_name.clone(),
        }
    }

    /// Upload `content` to `key`, stored as UTF-8.
    pub async fn upload(&self, key: &str, content: &str) -> Result<()> {
        debug!(bucket = %self.bucket, key, "uploading object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content.as_bytes().to_vec()))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Download the UTF-8 content stored at `key`.
    pub async fn download(&self, key: &str) -> Result<String> {
        debug!(bucket = %self.bucket, key, "downloading object");
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Download {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::Download {
                key: key.to_string(),
                message: e.to_string(),
            })?
            .into_bytes();

        String::from_utf8(bytes.to_vec()).map_err(|e| ObjectStoreError::NotUtf8 {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}
