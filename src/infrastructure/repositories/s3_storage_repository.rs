use super::storage_repository::AudioStorageRepository;
use crate::domain::pipeline::error::StorageError;
use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client as S3Client,
};
use std::sync::Arc;

/// S3 implementation of audio storage. Objects are written with a
/// public-read ACL so feed readers can fetch them without signing.
pub struct S3StorageRepository {
    s3_client: Arc<S3Client>,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
}

impl S3StorageRepository {
    pub fn new(
        s3_client: Arc<S3Client>,
        bucket: String,
        region: String,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            s3_client,
            bucket,
            region,
            public_base_url,
        }
    }

    /// URL an uploaded key is served from: the configured public base URL
    /// (a CDN in front of the bucket) or the bucket's virtual-hosted endpoint
    fn public_url(&self, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), encoded_key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, encoded_key
            ),
        }
    }

    fn classify_error(err: SdkError<PutObjectError>) -> StorageError {
        match err.code() {
            Some("AccessDenied") | Some("AllAccessDisabled") | Some("InvalidAccessKeyId") => {
                StorageError::Permission(err.to_string())
            }
            _ => StorageError::Upload(format!("{:?}", err)),
        }
    }
}

#[async_trait]
impl AudioStorageRepository for S3StorageRepository {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = data.len();
        let start_time = std::time::Instant::now();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size,
                    "S3 put_object failed"
                );
                Self::classify_error(e)
            })?;

        let url = self.public_url(key);
        tracing::info!(
            key = %key,
            size,
            latency_ms = start_time.elapsed().as_millis(),
            url = %url,
            "Audio uploaded"
        );

        Ok(url)
    }
}
