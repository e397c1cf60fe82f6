use rmcp::ErrorData as RpcError;

use thiserror::Error;
use tokio::io;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Failures of the persisted project collection. A missing project is not
/// an error; lookups report it through `Option`/`bool` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing storage exists but could not be read or parsed.
    #[error("failed to read projects from {location}: {reason}")]
    StorageRead { location: String, reason: String },
    /// Directory creation, serialization or the write itself failed.
    #[error("failed to write projects to {location}: {reason}")]
    StorageWrite { location: String, reason: String },
}

impl StoreError {
    pub fn read(location: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::StorageRead {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(location: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::StorageWrite {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        RpcError::internal_error(err.to_string(), None)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    FromString(String),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_name_their_location() {
        let err = StoreError::read("/tmp/projects.json", "expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "failed to read projects from /tmp/projects.json: expected value at line 1 column 1"
        );

        let err = StoreError::write("/tmp/projects.json", "permission denied");
        assert!(err.to_string().starts_with("failed to write projects to"));
    }

    #[test]
    fn store_errors_surface_as_internal_rpc_errors() {
        let rpc: RpcError = StoreError::write("memory", "boom").into();
        assert_eq!(rpc.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert!(rpc.message.contains("boom"));
    }
}
