use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use taskpad_core::ImageKind;

use crate::{ObjectStore, StoreConfig, StoreError};

pub struct S3Store {
    bucket: Box<Bucket>,
    url_expiry_secs: u32,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store").finish_non_exhaustive()
    }
}

impl S3Store {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let region = Region::Custom {
            region: config.region.clone().unwrap_or_else(|| "us-east-1".into()),
            endpoint: config.endpoint_url.clone().unwrap_or_default(),
        };

        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Internal(format!("credentials: {e}")))?;

        let bucket_name = config
            .bucket
            .as_deref()
            .ok_or_else(|| StoreError::Internal("bucket name required".into()))?;

        let mut bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StoreError::Internal(format!("bucket: {e}")))?;
        bucket.set_path_style();

        Ok(Self {
            bucket,
            url_expiry_secs: config.url_expiry(),
        })
    }
}

fn content_type_for_key(key: &str) -> &'static str {
    key.rsplit_once('.')
        .and_then(|(_, ext)| ImageKind::from_extension(ext))
        .map(|kind| kind.content_type())
        .unwrap_or("application/octet-stream")
}

fn map_s3_error(e: S3Error) -> StoreError {
    StoreError::Internal(format!("s3: {e}"))
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError> {
        let content_type = content_type_for_key(key);
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(map_s3_error)?;
        if response.status_code() >= 400 {
            return Err(StoreError::Internal(format!(
                "s3 put {}: status {}",
                key,
                response.status_code()
            )));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let response = self.bucket.get_object(key).await.map_err(map_s3_error)?;
        if response.status_code() == 404 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        if response.status_code() >= 400 {
            return Err(StoreError::Internal(format!(
                "s3 get {}: status {}",
                key,
                response.status_code()
            )));
        }
        Ok(Bytes::from(response.to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.bucket.delete_object(key).await.map_err(map_s3_error)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        match self.bucket.head_object(key).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, code)) if code >= 400 => Err(StoreError::Internal(format!(
                "s3 head {key}: status {code}"
            ))),
            Ok(_) => Ok(true),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(map_s3_error(e)),
        }
    }

    async fn url(&self, key: &str) -> Result<String, StoreError> {
        self.bucket
            .presign_get(key, self.url_expiry_secs, None)
            .await
            .map_err(map_s3_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StoreConfig {
        StoreConfig {
            endpoint_url: Some("http://localhost:3900".into()),
            region: Some("garage".into()),
            bucket: Some("test-bucket".into()),
            access_key_id: Some("key".into()),
            secret_access_key: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_bucket_produces_error() {
        let config = StoreConfig {
            bucket: None,
            ..config()
        };
        let err = S3Store::new(&config).unwrap_err();
        assert!(err.to_string().contains("bucket name required"));
    }

    #[test]
    fn valid_config_creates_store() {
        let store = S3Store::new(&config()).unwrap();
        assert_eq!(store.url_expiry_secs, 3600);
    }

    #[test]
    fn content_type_detection() {
        assert_eq!(content_type_for_key("attachments/a.png"), "image/png");
        assert_eq!(content_type_for_key("attachments/a.jpg"), "image/jpeg");
        assert_eq!(content_type_for_key("attachments/a.webp"), "image/webp");
        assert_eq!(
            content_type_for_key("attachments/a.bin"),
            "application/octet-stream"
        );
        assert_eq!(content_type_for_key("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn presigned_url_targets_bucket_and_key() {
        // Presigning is a local computation; no server is contacted.
        let store = S3Store::new(&config()).unwrap();
        let url = store.url("attachments/abc.png").await.unwrap();
        assert!(url.starts_with("http://localhost:3900/"));
        assert!(url.contains("test-bucket"));
        assert!(url.contains("attachments/abc.png"));
        assert!(url.contains("X-Amz-Expires=3600"));
    }

    // -- S3 integration tests (require a running S3-compatible server) --

    fn s3_config() -> Option<StoreConfig> {
        let config = StoreConfig::from_env();
        if config.is_s3() {
            Some(config)
        } else {
            None
        }
    }

    #[tokio::test]
    #[ignore]
    async fn s3_crud_roundtrip() {
        let config = s3_config().expect("S3 not configured; run with TASKPAD_S3_* set");
        let store = S3Store::new(&config).unwrap();
        let key = "integration-test/crud-roundtrip.png";

        store.put(key, Bytes::from("hello s3")).await.unwrap();

        let data = store.get(key).await.unwrap();
        assert_eq!(data.as_ref(), b"hello s3");
        assert!(store.exists(key).await.unwrap());

        store.delete(key).await.unwrap();
        assert!(!store.exists(key).await.unwrap());
        let err = store.get(key).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore]
    async fn s3_delete_nonexistent_is_noop() {
        let config = s3_config().expect("S3 not configured; run with TASKPAD_S3_* set");
        let store = S3Store::new(&config).unwrap();
        store
            .delete("integration-test/nonexistent-delete-target")
            .await
            .unwrap();
    }
}
