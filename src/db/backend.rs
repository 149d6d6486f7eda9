//! Durable backends for the document database.
//!
//! DESIGN
//! ======
//! A backend loads the whole database once at open and rewrites it whole
//! on every flush. `FileBackend` is the production medium: one JSON file,
//! replaced atomically via a sibling temp file and rename so a crash
//! mid-write never leaves a truncated store. `MemoryBackend` keeps the
//! snapshot in process; clones share the same slot, which lets tests
//! reopen a store against "the same file".

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::db::Database;
use crate::error::BackendError;

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Read the persisted database. `Ok(None)` when nothing was saved yet.
    async fn load(&self) -> Result<Option<Database>, BackendError>;

    /// Replace the persisted database with `db`.
    async fn persist(&self, db: &Database) -> Result<(), BackendError>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

// =============================================================================
// FILE BACKEND
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> BackendError {
        BackendError::Io { path: self.path.clone(), source }
    }

    async fn ensure_parent_dir(&self) -> Result<(), BackendError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e)),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Backend for FileBackend {
    async fn load(&self) -> Result<Option<Database>, BackendError> {
        self.ensure_parent_dir().await?;

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        // EDGE: an empty file is a slot that was created but never written.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| BackendError::Json { path: self.path.clone(), source })
    }

    async fn persist(&self, db: &Database) -> Result<(), BackendError> {
        let bytes =
            serde_json::to_vec_pretty(db).map_err(|source| BackendError::Json { path: self.path.clone(), source })?;

        self.ensure_parent_dir().await?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<Database>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the last persisted database, if any.
    #[must_use]
    pub fn persisted(&self) -> Option<Database> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn load(&self) -> Result<Option<Database>, BackendError> {
        Ok(self.persisted())
    }

    async fn persist(&self, db: &Database) -> Result<(), BackendError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(db.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
