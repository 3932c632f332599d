//! Store-level error composition.

use thiserror::Error;

use trolley_core::CartError;
use trolley_storage::StorageError;

/// Cart store operation error.
///
/// Composes domain and storage failures and adds the store's own cases.
/// Every persistence failure is surfaced here; nothing is swallowed between
/// the backend and the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Domain-level rejection.
    #[error("domain error: {0}")]
    Domain(#[from] CartError),

    /// Storage backend failure on read or write.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// The persisted cart payload did not parse as a line-item array.
    #[error("persisted cart is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The cart snapshot could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The worker task is gone: the handle is being used outside a live cart
    /// scope.
    #[error("cart worker is not running")]
    Closed,
}
