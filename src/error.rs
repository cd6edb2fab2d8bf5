//! Error types for the cart store.

use thiserror::Error;

/// Main error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Persisted cart could not be loaded: {0}")]
    LoadParse(String),

    #[error("Failed to write cart snapshot: {0}")]
    StorageWrite(String),

    #[error("Storage is locked by another process")]
    Locked,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Cart accessed outside of a CartProvider scope")]
    OutsideProvider,

    #[error("Snapshot writer has stopped")]
    WriterStopped,
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::Serialization(e.to_string())
    }
}

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
