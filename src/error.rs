//! Error types shared across the repository adapter.

use thiserror::Error;

/// Repository adapter error type
///
/// Every fallible operation in this crate returns this enum. Remote-originated
/// failures keep the remote message so the host can render it.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Admin settings document absent, malformed or incomplete. Fatal for the
    /// instance: construction aborts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote listing/search failed or the user workspace root could not be
    /// resolved.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Metadata lookup failed while pre-resolving a file reference.
    #[error("Cannot create reference: {0}")]
    CannotCreateReference(String),

    /// Stored reference blob is structurally invalid.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Remote download reported an error.
    #[error("Download failed: {0}")]
    Download(String),

    /// Temp file could not be written; the partial path has been removed.
    #[error("Local write failed: {0}")]
    TempWrite(#[from] std::io::Error),

    /// Referenced file no longer exists remotely (404-equivalent).
    #[error("File not found: {0}")]
    NotFound(String),
}

impl RepositoryError {
    /// Check whether this error should surface as a 404 rather than a
    /// generic repository failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(RepositoryError::NotFound("x".to_string()).is_not_found());
        assert!(!RepositoryError::Repository("x".to_string()).is_not_found());
    }
}
