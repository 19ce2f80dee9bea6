//! Error types for the obstacle registry
//!
//! Two families live here:
//!
//! - [`Error`]: failures that propagate to the presentation layer
//!   (validation, storage, configuration).
//! - [`ProviderError`]: non-fatal outcomes reported by location and image
//!   providers. The registry absorbs these and never turns them into [`Error`].

use crate::traits::Permission;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the obstacle registry
#[derive(Error, Debug)]
pub enum Error {
    /// A required text field was empty
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store could not produce the persisted collection
    #[error("Storage read failed: {0}")]
    StorageRead(String),

    /// The store could not replace the persisted collection
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// `load()` could not read the persisted collection
    ///
    /// The in-memory collection is left empty when this is returned.
    #[error("Could not load obstacles: {0}")]
    Load(String),

    /// A mutating operation could not persist its result
    ///
    /// The in-memory collection has been rolled back when this is returned.
    #[error("Could not save obstacles: {0}")]
    Persist(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage read error
    pub fn storage_read(msg: impl Into<String>) -> Self {
        Self::StorageRead(msg.into())
    }

    /// Create a storage write error
    pub fn storage_write(msg: impl Into<String>) -> Self {
        Self::StorageWrite(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is a validation failure (recoverable by re-prompting)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Non-fatal outcome of a location or image request
///
/// Every variant is recoverable: the registry falls back to the sentinel
/// position or to "no image" and carries on with creation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The user refused the runtime permission
    #[error("{0} permission denied")]
    PermissionDenied(Permission),

    /// The user dismissed the picker without choosing anything
    #[error("cancelled by user")]
    Cancelled,

    /// The device could not produce a value (radio off, timeout, bad file)
    #[error("acquisition failed: {0}")]
    AcquisitionFailure(String),
}

impl ProviderError {
    /// Create an acquisition failure
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::AcquisitionFailure(msg.into())
    }
}
