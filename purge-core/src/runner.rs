use crate::bucket::{BucketHandle, EmptyStats};
use crate::config::PurgeConfig;
use crate::error::Result;
use crate::store::Connector;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: EmptyStats,
    pub bucket_deleted: bool,
}

/// Empty the configured bucket and, if requested, delete it.
pub async fn run<C: Connector + ?Sized>(config: &PurgeConfig, connector: &C) -> Result<PurgeReport> {
    let store = connector.connect(config.profile.as_deref()).await?;
    let bucket = BucketHandle::new(&store, config.bucket.as_str());

    tracing::info!("Emptying bucket: {}", bucket.name());
    let removed = bucket.delete_all_versions().await?;
    tracing::info!(
        "Emptied bucket {}: {} versions, {} delete markers",
        bucket.name(),
        removed.versions,
        removed.delete_markers
    );

    if config.delete_bucket {
        bucket.delete().await?;
        tracing::info!("Deleted bucket: {}", bucket.name());
    }

    Ok(PurgeReport {
        removed,
        bucket_deleted: config.delete_bucket,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryConnector, MemoryStore, Operation};
    use crate::store::ObjectVersion;

    fn connector_with(bucket: &str, objects: usize, versions_each: usize) -> MemoryConnector {
        let store = MemoryStore::with_page_size(4);
        store.create_bucket(bucket);
        for o in 0..objects {
            for v in 0..versions_each {
                store.put(bucket, ObjectVersion::version(format!("k{o}"), format!("v{v}")));
            }
        }
        MemoryConnector::new(store)
    }

    #[tokio::test]
    async fn keeps_the_bucket_by_default() {
        let connector = connector_with("data", 5, 2);

        let report = run(&PurgeConfig::new("data"), &connector).await.unwrap();

        assert_eq!(report.removed.versions, 10);
        assert!(!report.bucket_deleted);
        assert!(connector.store().bucket_exists("data"));
        assert_eq!(connector.store().version_count("data"), Some(0));
        assert_eq!(connector.store().delete_bucket_calls(), 0);
    }

    #[tokio::test]
    async fn deletes_the_bucket_when_asked() {
        let connector = connector_with("logs-2023", 3, 2);
        let config = PurgeConfig::new("logs-2023").with_delete_bucket(true);

        let report = run(&config, &connector).await.unwrap();

        assert_eq!(report.removed.versions, 6);
        assert!(report.bucket_deleted);
        assert!(!connector.store().bucket_exists("logs-2023"));
        assert_eq!(connector.store().delete_bucket_calls(), 1);
    }

    #[tokio::test]
    async fn passes_the_profile_to_the_connector() {
        let connector = connector_with("data", 1, 1);

        let config = PurgeConfig::new("data").with_profile(Some("foo".into()));
        run(&config, &connector).await.unwrap();
        run(&PurgeConfig::new("data"), &connector).await.unwrap();

        assert_eq!(connector.profiles(), vec![Some("foo".to_string()), None]);
    }

    #[tokio::test]
    async fn bucket_is_not_deleted_after_a_failed_purge() {
        let connector = connector_with("data", 2, 2);
        connector.store().fail(Operation::ListVersions, "AccessDenied");
        let config = PurgeConfig::new("data").with_delete_bucket(true);

        let err = run(&config, &connector).await.unwrap_err();

        assert_eq!(err.code(), "AccessDenied");
        assert_eq!(connector.store().delete_bucket_calls(), 0);
        assert!(connector.store().bucket_exists("data"));
    }

    #[tokio::test]
    async fn reports_bucket_delete_failures() {
        let connector = connector_with("data", 1, 1);
        connector.store().fail(Operation::DeleteBucket, "AccessDenied");
        let config = PurgeConfig::new("data").with_delete_bucket(true);

        let err = run(&config, &connector).await.unwrap_err();

        assert_eq!(err.code(), "AccessDenied");
        assert_eq!(connector.store().version_count("data"), Some(0));
    }
}
