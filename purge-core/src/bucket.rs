use crate::error::Result;
use crate::store::{ObjectStore, VersionCursor, MAX_DELETE_BATCH};

/// Counts of what an emptying pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyStats {
    pub versions: usize,
    pub delete_markers: usize,
}

/// A named bucket on a store. Creating one performs no I/O.
pub struct BucketHandle<'a, S: ?Sized> {
    store: &'a S,
    name: String,
}

impl<'a, S: ObjectStore + ?Sized> BucketHandle<'a, S> {
    pub fn new(store: &'a S, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delete every object version and delete marker in the bucket.
    ///
    /// Walks the whole version listing page by page and deletes each page
    /// in batches of at most [`MAX_DELETE_BATCH`]. Stops at the first failure.
    pub async fn delete_all_versions(&self) -> Result<EmptyStats> {
        let mut stats = EmptyStats::default();
        let mut cursor: Option<VersionCursor> = None;
        let mut pages = 0usize;

        loop {
            let page = self.store.list_versions(&self.name, cursor.as_ref()).await?;
            pages += 1;
            tracing::debug!(
                "Listed page {}: bucket={}, entries={}, truncated={}",
                pages,
                self.name,
                page.versions.len(),
                page.next.is_some()
            );

            for batch in page.versions.chunks(MAX_DELETE_BATCH) {
                self.store.delete_versions(&self.name, batch).await?;

                let markers = batch.iter().filter(|v| v.is_delete_marker).count();
                stats.delete_markers += markers;
                stats.versions += batch.len() - markers;
                tracing::debug!("Deleted batch: bucket={}, size={}", self.name, batch.len());
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(stats)
    }

    /// Delete the bucket itself. Only succeeds once it is empty.
    pub async fn delete(&self) -> Result<()> {
        tracing::debug!("Deleting bucket: {}", self.name);
        self.store.delete_bucket(&self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, Operation};
    use crate::store::ObjectVersion;

    fn seeded(page_size: usize, objects: usize, versions_each: usize) -> MemoryStore {
        let store = MemoryStore::with_page_size(page_size);
        store.create_bucket("data");
        for o in 0..objects {
            for v in 0..versions_each {
                store.put(
                    "data",
                    ObjectVersion::version(format!("obj-{o:05}"), format!("v{v}")),
                );
            }
        }
        store
    }

    #[tokio::test]
    async fn empty_bucket_is_a_no_op() {
        let store = MemoryStore::new();
        store.create_bucket("data");

        let stats = BucketHandle::new(&store, "data")
            .delete_all_versions()
            .await
            .unwrap();

        assert_eq!(stats, EmptyStats::default());
        assert!(store.bucket_exists("data"));
        assert_eq!(store.list_calls(), 1);
        assert!(store.delete_batches().is_empty());
    }

    #[tokio::test]
    async fn running_twice_succeeds() {
        let store = seeded(1000, 4, 3);
        let bucket = BucketHandle::new(&store, "data");

        assert_eq!(bucket.delete_all_versions().await.unwrap().versions, 12);
        assert_eq!(bucket.delete_all_versions().await.unwrap(), EmptyStats::default());
        assert_eq!(store.version_count("data"), Some(0));
    }

    #[tokio::test]
    async fn walks_every_page() {
        for total in [1, 100, 10_000] {
            let store = seeded(7, total, 1);

            let stats = BucketHandle::new(&store, "data")
                .delete_all_versions()
                .await
                .unwrap();

            assert_eq!(stats.versions, total);
            assert_eq!(store.version_count("data"), Some(0));
            assert!(store.list_calls() >= total.div_ceil(7));
        }
    }

    #[tokio::test]
    async fn batches_never_exceed_the_request_limit() {
        let store = seeded(2500, 1250, 2);

        BucketHandle::new(&store, "data")
            .delete_all_versions()
            .await
            .unwrap();

        assert_eq!(store.delete_batches(), vec![1000, 1000, 500]);
        assert_eq!(store.version_count("data"), Some(0));
    }

    #[tokio::test]
    async fn removes_delete_markers() {
        let store = MemoryStore::with_page_size(2);
        store.create_bucket("data");
        store.put("data", ObjectVersion::version("a", "1"));
        store.put("data", ObjectVersion::delete_marker("a", "2"));
        store.put("data", ObjectVersion::delete_marker("b", "1"));

        let stats = BucketHandle::new(&store, "data")
            .delete_all_versions()
            .await
            .unwrap();

        assert_eq!(
            stats,
            EmptyStats {
                versions: 1,
                delete_markers: 2
            }
        );
        assert_eq!(store.version_count("data"), Some(0));
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let store = seeded(5, 20, 1);
        store.fail(Operation::DeleteVersions, "AccessDenied");

        let err = BucketHandle::new(&store, "data")
            .delete_all_versions()
            .await
            .unwrap_err();

        assert_eq!(err.code(), "AccessDenied");
        assert_eq!(store.list_calls(), 1);
        assert_eq!(store.version_count("data"), Some(20));
    }

    #[tokio::test]
    async fn missing_bucket_fails_on_listing() {
        let store = MemoryStore::new();

        let err = BucketHandle::new(&store, "nope")
            .delete_all_versions()
            .await
            .unwrap_err();

        assert_eq!(err.code(), "NoSuchBucket");
    }

    #[tokio::test]
    async fn delete_requires_an_empty_bucket() {
        let store = seeded(1000, 1, 1);
        let bucket = BucketHandle::new(&store, "data");

        assert_eq!(bucket.delete().await.unwrap_err().code(), "BucketNotEmpty");

        bucket.delete_all_versions().await.unwrap();
        bucket.delete().await.unwrap();
        assert!(!store.bucket_exists("data"));
    }
}
