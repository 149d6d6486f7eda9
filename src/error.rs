//! Error types shared by the store, the document database, and backends.
//!
//! DESIGN
//! ======
//! Every error carries a stable machine code via [`ErrorCode`] so hosts can
//! branch on the failure class without matching message text. Validation and
//! duplicate-id failures are raised before any mutation; storage failures
//! come from the backend and are the only retryable class.

use std::path::PathBuf;

// =============================================================================
// ERROR CODE
// =============================================================================

/// Stable, machine-readable classification of an error.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// BACKEND ERROR
// =============================================================================

/// Failures reading or writing the durable medium.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed store data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ErrorCode for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_BACKEND_IO",
            Self::Json { .. } => "E_BACKEND_JSON",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

// =============================================================================
// STORE ERROR
// =============================================================================

/// Errors returned by [`crate::WidgetStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The input was nil or could not be used as a record.
    #[error("invalid item: {0}")]
    Validation(String),

    /// `add_item` target id is already present.
    #[error("an item with id '{0}' already exists")]
    DuplicateId(String),

    /// The backing medium could not be opened or loaded at init time.
    #[error("store init failed: {0}")]
    StorageInit(#[source] BackendError),

    /// An explicit flush could not write the durable medium.
    #[error("storage error: {0}")]
    Storage(#[from] BackendError),
}

impl StoreError {
    pub(crate) fn nil_input() -> Self {
        Self::Validation("input is nil".into())
    }
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
            Self::StorageInit(_) => "E_STORAGE_INIT",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Storage(inner) => inner.retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
