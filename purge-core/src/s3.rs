use async_trait::async_trait;
use aws_sdk_s3::{
    types::{Delete, ObjectIdentifier},
    Client,
};

use crate::error::{Result, StorageError};
use crate::store::{Connector, ObjectStore, ObjectVersion, VersionCursor, VersionPage};

#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_versions(
        &self,
        bucket: &str,
        cursor: Option<&VersionCursor>,
    ) -> Result<VersionPage> {
        tracing::debug!("S3 LIST VERSIONS: bucket={}, cursor={:?}", bucket, cursor);

        let mut request = self.client.list_object_versions().bucket(bucket);
        if let Some(cursor) = cursor {
            request = request
                .key_marker(&cursor.key_marker)
                .set_version_id_marker(cursor.version_id_marker.clone());
        }
        let output = request.send().await?;

        let versions = output.versions().iter().map(|v| ObjectVersion {
            key: v.key().unwrap_or_default().to_string(),
            version_id: v.version_id().map(str::to_string),
            is_delete_marker: false,
        });
        let markers = output.delete_markers().iter().map(|m| ObjectVersion {
            key: m.key().unwrap_or_default().to_string(),
            version_id: m.version_id().map(str::to_string),
            is_delete_marker: true,
        });
        let versions = versions.chain(markers).collect();

        let next = if output.is_truncated().unwrap_or(false) {
            // A truncated listing must carry a marker to continue from
            let key = output.next_key_marker().ok_or_else(|| {
                StorageError::service(
                    "ResponseError",
                    format!("truncated version listing for {bucket} carries no NextKeyMarker"),
                )
            })?;
            Some(VersionCursor {
                key_marker: key.to_string(),
                version_id_marker: output.next_version_id_marker().map(str::to_string),
            })
        } else {
            None
        };

        Ok(VersionPage { versions, next })
    }

    async fn delete_versions(&self, bucket: &str, batch: &[ObjectVersion]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        tracing::debug!("S3 DELETE OBJECTS: bucket={}, count={}", bucket, batch.len());

        let objects = batch
            .iter()
            .map(|v| {
                ObjectIdentifier::builder()
                    .key(&v.key)
                    .set_version_id(v.version_id.clone())
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await?;

        // Quiet mode only reports the entries that failed.
        if let Some(failed) = output.errors().first() {
            tracing::debug!("S3 DELETE OBJECTS: {} entries rejected", output.errors().len());
            return Err(StorageError::Rejected {
                code: failed.code().unwrap_or("Unknown").to_string(),
                key: failed.key().unwrap_or_default().to_string(),
                version_id: failed.version_id().map(str::to_string),
                message: failed.message().unwrap_or_default().to_string(),
            });
        }

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        tracing::debug!("S3 DELETE BUCKET: bucket={}", bucket);

        self.client.delete_bucket().bucket(bucket).send().await?;

        tracing::debug!("S3 DELETE BUCKET success: bucket={}", bucket);
        Ok(())
    }
}

/// Builds [`S3Client`]s from the shared AWS configuration chain.
#[derive(Debug, Clone, Default)]
pub struct AwsConnector {
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack, ...).
    pub endpoint_url: Option<String>,
}

#[async_trait]
impl Connector for AwsConnector {
    type Store = S3Client;

    async fn connect(&self, profile: Option<&str>) -> Result<S3Client> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(profile) = profile {
            tracing::debug!("Using credential profile: {}", profile);
            config_loader = config_loader.profile_name(profile);
        }
        if let Some(region) = &self.region {
            config_loader = config_loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint_url);
        }

        let config = config_loader.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&config);

        // S3-compatible services generally need path-style addressing
        if self.endpoint_url.is_some() {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        Ok(S3Client::from_client(Client::from_conf(s3_config_builder.build())))
    }
}
