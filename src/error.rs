//! Error types for the task store and the service layer.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of [`TaskStore`](crate::store::TaskStore) operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or rewriting the task file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `create` was given an id that is already stored.
    #[error("a task with id '{0}' already exists")]
    DuplicateId(String),

    /// `delete` matched no task.
    #[error("no task with id '{0}'")]
    NotFound(String),

    /// The blocking worker running a store call panicked or was cancelled.
    #[error("store worker failed: {0}")]
    Worker(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures reported by [`TaskService`](crate::service::TaskService).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Required fields were blank; the store was not touched.
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
