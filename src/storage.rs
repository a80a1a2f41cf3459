use async_trait::async_trait;
use aws_sdk_s3 as s3;
use axum::body::Bytes;
use s3::primitives::ByteStream;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// StorageError
///
/// Failures while persisting an uploaded object.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("failed to write {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("object store rejected {key}: {message}")]
    Remote { key: String, message: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// StoredObject
///
/// Where an object ended up: its sanitized key and the URL it is publicly served from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

// 1. StorageService Contract
/// StorageService
///
/// Abstract contract of the upload sink. Handlers only see this trait, so the local
/// directory tree, an S3-compatible bucket and the test mock are interchangeable.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Prepares the backend at startup (creates the root directory or the bucket).
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    /// Writes `body` under `key` and returns where it can be fetched from.
    ///
    /// # Arguments
    /// * `key`: The object key relative to the storage root, e.g. `avatars/jane-1700000000000-a1b2c3d4.png`.
    /// * `content_type`: MIME type recorded with the object where the backend supports it.
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredObject, StorageError>;
}

/// sanitize_key
///
/// Prevents path traversal by removing directory navigation components
/// (`..`, `.`, empty segments) from a key before it touches any backend.
pub fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn checked_key(key: &str) -> Result<String, StorageError> {
    let sanitized = sanitize_key(key);
    if sanitized.is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(sanitized)
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

// 2. Local directory tree
/// LocalDiskStorage
///
/// Writes uploads below `root`; the router serves that directory read-only under
/// `public_prefix`.
#[derive(Clone, Debug)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Unavailable(format!("{}: {e}", self.root.display())))
    }

    async fn put_object(
        &self,
        key: &str,
        _content_type: &str,
        body: Bytes,
    ) -> Result<StoredObject, StorageError> {
        let key = checked_key(key)?;
        let path = self.root.join(&key);
        let io_err = |source| StorageError::Io {
            key: key.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, &body).await.map_err(io_err)?;

        tracing::debug!(key = %key, bytes = body.len(), "Upload written to disk");
        Ok(StoredObject {
            url: join_url(&self.public_prefix, &key),
            key,
        })
    }
}

// 3. S3-compatible bucket (MinIO, Supabase Storage, AWS)
/// S3StorageClient
///
/// Uses the AWS SDK with `force_path_style(true)`, which MinIO and Supabase Storage
/// gateways require.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_url: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Constructs the S3 client from static credentials.
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_url: public_url.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// ensure_ready
    ///
    /// Creates the bucket when it is missing. A failure here is logged, not fatal: hosted
    /// providers often forbid CreateBucket on pre-provisioned buckets.
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::warn!(bucket = %self.bucket_name, error = %e, "Could not create upload bucket");
        }
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredObject, StorageError> {
        let key = checked_key(key)?;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Remote {
                key: key.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(key = %key, bucket = %self.bucket_name, "Upload stored in bucket");
        Ok(StoredObject {
            url: join_url(&self.public_url, &key),
            key,
        })
    }
}

// 4. The Mock Implementation (For Tests)
/// StoredWrite
///
/// One write captured by [`MockStorageService`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredWrite {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

/// MockStorageService
///
/// Records every write instead of persisting it, so tests can assert what reached the
/// storage layer (and, for rejected uploads, that nothing did). Clones share the record.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all writes return a simulated failure.
    pub should_fail: bool,
    writes: Arc<Mutex<Vec<StoredWrite>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub async fn writes(&self) -> Vec<StoredWrite> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredObject, StorageError> {
        if self.should_fail {
            return Err(StorageError::Unavailable(
                "mock storage failure requested".to_string(),
            ));
        }

        let key = checked_key(key)?;
        self.writes.lock().await.push(StoredWrite {
            key: key.clone(),
            content_type: content_type.to_string(),
            size: body.len(),
        });

        Ok(StoredObject {
            url: format!("http://localhost:9000/mock-bucket/{key}"),
            key,
        })
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
