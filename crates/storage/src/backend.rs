//! The key-value storage boundary.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation error.
///
/// Infrastructure failures only (opening, reading, writing); cart semantics
/// never leak down here.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open storage: {0}")]
    Open(String),

    #[error("storage read failed: {0}")]
    Read(String),

    #[error("storage write failed: {0}")]
    Write(String),
}

impl StorageError {
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
}

/// Asynchronous key-value storage.
///
/// The contract mirrors a mobile device's local storage API: string keys,
/// string values, `get` answers `None` for an absent key, `set` overwrites
/// whatever was there. Failures are returned, never swallowed, so callers
/// decide whether to retry or surface them.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S> StorageBackend for Arc<S>
where
    S: StorageBackend + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }
}
