//! Missing entity errors.

/// A referenced record does not exist.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Found: {} '{}' at line {} in {}", resource, id, line, file)]
pub struct NotFoundError {
    /// What was looked up (e.g. "entity")
    pub resource: String,
    /// Identifier that was not found
    pub id: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NotFoundError {
    /// Create a new NotFoundError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer_error::NotFoundError;
    ///
    /// let err = NotFoundError::new("entity", "c1");
    /// assert_eq!(err.id, "c1");
    /// ```
    #[track_caller]
    pub fn new(resource: impl Into<String>, id: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            resource: resource.into(),
            id: id.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
