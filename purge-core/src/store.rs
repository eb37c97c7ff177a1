use async_trait::async_trait;

use crate::error::Result;

/// Largest number of identifiers a single `DeleteObjects` request accepts.
pub const MAX_DELETE_BATCH: usize = 1000;

/// One entry of a version listing: an object version or a delete marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: Option<String>,
    pub is_delete_marker: bool,
}

impl ObjectVersion {
    pub fn version(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            is_delete_marker: false,
        }
    }

    pub fn delete_marker(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            is_delete_marker: true,
        }
    }
}

/// Position after which a version listing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCursor {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VersionPage {
    pub versions: Vec<ObjectVersion>,
    /// Set when the listing was truncated.
    pub next: Option<VersionCursor>,
}

/// Versioned object storage as seen by the purge procedure.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of versions and delete markers, starting after `cursor`.
    async fn list_versions(&self, bucket: &str, cursor: Option<&VersionCursor>)
        -> Result<VersionPage>;

    /// Delete up to [`MAX_DELETE_BATCH`] versions in one request.
    async fn delete_versions(&self, bucket: &str, batch: &[ObjectVersion]) -> Result<()>;

    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

/// Builds an authenticated store, optionally scoped to a credential profile.
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: ObjectStore;

    async fn connect(&self, profile: Option<&str>) -> Result<Self::Store>;
}
