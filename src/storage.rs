use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// StoredObject
///
/// What a successful store returns: the backend's identifier for the object
/// (used later for deletion) and the URL clients fetch it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub public_id: String,
    pub url: String,
}

/// StorageError
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object name: {0}")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// StorageService
///
/// Abstract contract for the object storage layer. The concrete implementation
/// is swappable: local disk under the configured upload root, an S3-compatible
/// store (MinIO locally), or the in-memory Mock during testing.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Prepares the backing store (creates the upload directory or bucket).
    /// Safe to call at every startup.
    async fn ensure_ready(&self);

    /// Writes `bytes` under a name derived from `filename` and returns the
    /// stored identifier plus a public URL.
    ///
    /// Implementations must reject any name that would resolve outside their
    /// root (path traversal via crafted filenames).
    async fn store(
        &self,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Best-effort delete. A missing object is not an error, so the call is
    /// idempotent.
    async fn remove(&self, public_id: &str) -> Result<(), StorageError>;
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;

/// sanitize_key
///
/// Utility function to prevent path traversal attacks by removing directory
/// navigation components (e.g. `..`, `.`) from a user-provided key segment.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// True when `name` is a single, traversal-free path component.
fn is_plain_component(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

// 1. The Local Filesystem Implementation

/// LocalStorage
///
/// Stores uploads as files under a fixed root directory. Objects are served
/// back by the static `/uploads` route, so the public URL is simply the base
/// URL joined with the stored name.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves `name` against the root, refusing anything that is not a
    /// plain file name or that would land outside the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !is_plain_component(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        let path = self.root.join(name);
        if !path.starts_with(&self.root) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl StorageService for LocalStorage {
    async fn ensure_ready(&self) {
        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            tracing::error!("failed to create upload root {:?}: {}", self.root, e);
        }
    }

    async fn store(
        &self,
        filename: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.resolve(filename)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(StoredObject {
            public_id: filename.to_string(),
            url: format!("{}/uploads/{}", self.public_base_url, filename),
        })
    }

    async fn remove(&self, public_id: &str) -> Result<(), StorageError> {
        let path = self.resolve(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone: deletion is idempotent.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

// 2. The S3-Compatible Implementation (MinIO locally)

/// S3StorageClient
///
/// Object storage via the AWS SDK. `force_path_style(true)` keeps the client
/// compatible with MinIO and other S3 gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    endpoint: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Constructs the S3 client using credentials and configuration from AppConfig.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            // Path-style addressing (http://endpoint/bucket/key) is required
            // for MinIO and most self-hosted S3 gateways.
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            bucket_name: bucket.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// Calls the S3 CreateBucket API. The API is idempotent, so this only
    /// creates the bucket if it does not already exist.
    async fn ensure_ready(&self) {
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn store(
        &self,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = sanitize_key(filename);
        if key.is_empty() {
            return Err(StorageError::InvalidName(filename.to_string()));
        }

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(StoredObject {
            url: format!("{}/{}/{}", self.endpoint, self.bucket_name, key),
            public_id: key,
        })
    }

    async fn remove(&self, public_id: &str) -> Result<(), StorageError> {
        // DeleteObject succeeds for missing keys, so idempotency comes for free.
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(sanitize_key(public_id))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

// 3. The Mock Implementation (For Tests)

/// MockStorageService
///
/// In-memory stand-in for the storage layer used by unit and router tests.
/// Records every store/remove call so tests can assert cleanup behavior, and
/// can simulate failures on either operation.
#[derive(Default)]
pub struct MockStorageService {
    /// When true, store operations return a simulated failure.
    pub fail_stores: bool,
    /// When true, remove operations return a simulated failure. Used to test
    /// the best-effort cleanup policy.
    pub fail_removals: bool,
    pub stored: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            fail_stores: true,
            fail_removals: true,
            ..Self::default()
        }
    }

    pub fn new_with_failing_removals() -> Self {
        Self {
            fail_removals: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) {
        // No-op in the mock environment.
    }

    async fn store(
        &self,
        filename: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        if self.fail_stores {
            return Err(StorageError::Backend(
                "Mock Storage Error: simulation requested".to_string(),
            ));
        }
        let key = sanitize_key(filename);
        self.stored.lock().unwrap().push(key.clone());
        Ok(StoredObject {
            url: format!("http://localhost:9000/mock-bucket/{}?signature=fake", key),
            public_id: key,
        })
    }

    async fn remove(&self, public_id: &str) -> Result<(), StorageError> {
        if self.fail_removals {
            return Err(StorageError::Backend(
                "Mock Storage Error: simulation requested".to_string(),
            ));
        }
        self.removed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Convenience for handlers: remove a batch of identifiers best-effort,
/// logging failures without interrupting the caller.
pub async fn remove_all(
    storage: &dyn StorageService,
    identifiers: impl IntoIterator<Item = String>,
) -> crate::attachments::CleanupOutcome {
    let mut outcome = crate::attachments::CleanupOutcome::default();
    for id in identifiers {
        match storage.remove(&id).await {
            Ok(()) => outcome.record_removed(),
            Err(e) => {
                tracing::warn!("failed to remove stored object {}: {}", id, e);
                outcome.record_failure(id);
            }
        }
    }
    outcome
}
