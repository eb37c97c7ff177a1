pub mod bucket;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod runner;
pub mod s3;
pub mod store;

pub use bucket::{BucketHandle, EmptyStats};
pub use config::PurgeConfig;
pub use error::StorageError;
pub use runner::{run, PurgeReport};
pub use s3::{AwsConnector, S3Client};
pub use store::{Connector, ObjectStore, ObjectVersion, VersionCursor, VersionPage};
