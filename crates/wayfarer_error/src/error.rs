//! Top-level error wrapper types.

use crate::{
    ClassificationError, CompressionError, ConfigError, JsonError, NotFoundError, StorageError,
    StoreError, TransportError, ValidationError,
};

/// Every error condition a Wayfarer operation can surface.
///
/// # Examples
///
/// ```
/// use wayfarer_error::{WayfarerError, ConfigError};
///
/// let err: WayfarerError = ConfigError::new("blob storage is not configured").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum WayfarerErrorKind {
    /// Required backend configuration missing or invalid
    #[from(ConfigError)]
    Config(ConfigError),
    /// Image value could not be classified
    #[from(ClassificationError)]
    Classification(ClassificationError),
    /// Network failure while fetching a source image
    #[from(TransportError)]
    Transport(TransportError),
    /// Referenced record does not exist
    #[from(NotFoundError)]
    NotFound(NotFoundError),
    /// Blob storage failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Document store failure
    #[from(StoreError)]
    Store(StoreError),
    /// Codec failure
    #[from(CompressionError)]
    Compression(CompressionError),
    /// Invalid caller input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Wayfarer error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Wayfarer Error: {}", _0)]
pub struct WayfarerError(Box<WayfarerErrorKind>);

impl WayfarerError {
    /// Create a new error from a kind.
    pub fn new(kind: WayfarerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WayfarerErrorKind {
        &self.0
    }

    /// True for missing or invalid backend configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), WayfarerErrorKind::Config(_))
    }

    /// True when a referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), WayfarerErrorKind::NotFound(_))
    }

    /// True for invalid caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), WayfarerErrorKind::Validation(_))
    }
}

// Generic From implementation for any type that converts to WayfarerErrorKind
impl<T> From<T> for WayfarerError
where
    T: Into<WayfarerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Wayfarer operations.
pub type WayfarerResult<T> = std::result::Result<T, WayfarerError>;
