use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::info;

use super::AttachmentStore;
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
}

/// S3-compatible object storage (MinIO locally, the hosted bucket in
/// production).
#[derive(Clone)]
pub struct S3AttachmentStore {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3AttachmentStore {
    pub async fn connect(settings: &S3Settings) -> Self {
        // Credentials come from the standard AWS_* environment variables.
        let region_provider =
            RegionProviderChain::default_provider().or_else(Region::new(settings.region.clone()));
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        // Path-style addressing keeps MinIO and other S3 look-alikes working.
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(true)
            .endpoint_url(&settings.endpoint)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            endpoint: settings.endpoint.clone(),
        }
    }

    /// Creates the bucket if it does not exist yet.
    pub async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        info!(bucket = %self.bucket, "creating attachment bucket");
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Bucket(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for S3AttachmentStore {
    async fn store(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), self.bucket, path)
    }
}
