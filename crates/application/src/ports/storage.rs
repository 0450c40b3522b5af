//! Session storage port
//!
//! A string key-value store with the shape of browser-local storage. One
//! entry per provider; the session store owns the encoding.

use async_trait::async_trait;

/// Errors that can occur while reading or writing stored entries.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key-value storage for persisted sessions.
///
/// Writers are not coordinated; the last write wins.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads an entry.
    ///
    /// # Returns
    /// `None` if no entry exists for `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes an entry, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes an entry. Deleting a missing entry is not an error.
    ///
    /// # Errors
    /// Returns an error if the entry exists but cannot be removed.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
