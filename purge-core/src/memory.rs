//! In-memory versioned store for tests.
//!
//! Listings are ordered by `(key, version id)` and continue strictly after the
//! cursor, so deleting entries between pages never skips or repeats one.
//! Bucket errors follow S3: `NoSuchBucket` for unknown buckets and
//! `BucketNotEmpty` when deleting a bucket that still holds versions.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, StorageError};
use crate::store::{Connector, ObjectStore, ObjectVersion, VersionCursor, VersionPage};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// Version id S3 reports for objects written while versioning was off.
const NULL_VERSION_ID: &str = "null";

type VersionKey = (String, String);

fn version_id_or_null(version_id: Option<&str>) -> String {
    version_id.unwrap_or(NULL_VERSION_ID).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListVersions,
    DeleteVersions,
    DeleteBucket,
}

#[derive(Default)]
struct State {
    buckets: HashMap<String, BTreeMap<VersionKey, bool>>,
    failures: HashMap<Operation, String>,
    list_calls: usize,
    delete_batches: Vec<usize>,
    delete_bucket_calls: usize,
}

#[derive(Clone)]
pub struct MemoryStore {
    page_size: usize,
    state: Arc<Mutex<State>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Arc::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state().buckets.entry(bucket.to_string()).or_default();
    }

    /// Add a version or delete marker, creating the bucket if needed.
    pub fn put(&self, bucket: &str, version: ObjectVersion) {
        let id = version_id_or_null(version.version_id.as_deref());
        self.state()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert((version.key, id), version.is_delete_marker);
    }

    /// Make every later call of `operation` fail with `code`.
    pub fn fail(&self, operation: Operation, code: &str) {
        self.state().failures.insert(operation, code.to_string());
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.state().buckets.contains_key(bucket)
    }

    pub fn version_count(&self, bucket: &str) -> Option<usize> {
        self.state().buckets.get(bucket).map(BTreeMap::len)
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    /// Size of every delete request, in order.
    pub fn delete_batches(&self) -> Vec<usize> {
        self.state().delete_batches.clone()
    }

    pub fn delete_bucket_calls(&self) -> usize {
        self.state().delete_bucket_calls
    }

    fn check(state: &State, operation: Operation) -> Result<()> {
        match state.failures.get(&operation) {
            Some(code) => Err(StorageError::service(code.clone(), "injected failure")),
            None => Ok(()),
        }
    }

    fn no_such_bucket(bucket: &str) -> StorageError {
        StorageError::service("NoSuchBucket", format!("The specified bucket does not exist: {bucket}"))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_versions(
        &self,
        bucket: &str,
        cursor: Option<&VersionCursor>,
    ) -> Result<VersionPage> {
        let mut state = self.state();
        state.list_calls += 1;
        Self::check(&state, Operation::ListVersions)?;

        let versions = state
            .buckets
            .get(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;

        let start = match cursor {
            Some(c) => Bound::Excluded((
                c.key_marker.clone(),
                version_id_or_null(c.version_id_marker.as_deref()),
            )),
            None => Bound::Unbounded,
        };

        let mut remaining = versions.range((start, Bound::Unbounded));
        let page: Vec<ObjectVersion> = remaining
            .by_ref()
            .take(self.page_size)
            .map(|((key, id), marker)| ObjectVersion {
                key: key.clone(),
                version_id: Some(id.clone()),
                is_delete_marker: *marker,
            })
            .collect();

        let next = match (remaining.next(), page.last()) {
            (Some(_), Some(last)) => Some(VersionCursor {
                key_marker: last.key.clone(),
                version_id_marker: last.version_id.clone(),
            }),
            _ => None,
        };

        Ok(VersionPage {
            versions: page,
            next,
        })
    }

    async fn delete_versions(&self, bucket: &str, batch: &[ObjectVersion]) -> Result<()> {
        let mut state = self.state();
        state.delete_batches.push(batch.len());
        Self::check(&state, Operation::DeleteVersions)?;

        let versions = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        for v in batch {
            versions.remove(&(v.key.clone(), version_id_or_null(v.version_id.as_deref())));
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state();
        state.delete_bucket_calls += 1;
        Self::check(&state, Operation::DeleteBucket)?;

        let empty = state
            .buckets
            .get(bucket)
            .map(BTreeMap::is_empty)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        if !empty {
            return Err(StorageError::service(
                "BucketNotEmpty",
                "The bucket you tried to delete is not empty",
            ));
        }

        state.buckets.remove(bucket);
        Ok(())
    }
}

/// Hands out clones of one [`MemoryStore`] and records requested profiles.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    store: MemoryStore,
    profiles: Arc<Mutex<Vec<Option<String>>>>,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            profiles: Arc::default(),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Profile argument of every `connect` call, in order.
    pub fn profiles(&self) -> Vec<Option<String>> {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, profile: Option<&str>) -> Result<MemoryStore> {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(profile.map(str::to_string));
        Ok(self.store.clone())
    }
}
