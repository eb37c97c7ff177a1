use aws_sdk_s3::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::fmt::Debug;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure reported by the storage service or its transport.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("{code}: failed to delete {key} (version {version}): {message}", version = .version_id.as_deref().unwrap_or("null"))]
    Rejected {
        code: String,
        key: String,
        version_id: Option<String>,
        message: String,
    },

    #[error("failed to build request: {0}")]
    Build(#[from] BuildError),
}

impl StorageError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable code, e.g. `AccessDenied` or `NoSuchBucket`.
    pub fn code(&self) -> &str {
        match self {
            Self::Service { code, .. } | Self::Rejected { code, .. } => code,
            Self::Build(_) => "ConstructionFailure",
        }
    }
}

impl<E, R> From<SdkError<E, R>> for StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        let code = match &err {
            SdkError::ServiceError(context) => context.err().code().unwrap_or("Unknown"),
            SdkError::ConstructionFailure(_) => "ConstructionFailure",
            SdkError::TimeoutError(_) => "TimeoutError",
            SdkError::DispatchFailure(_) => "DispatchFailure",
            SdkError::ResponseError(_) => "ResponseError",
            _ => "Unknown",
        }
        .to_string();

        Self::service(code, DisplayErrorContext(err).to_string())
    }
}
