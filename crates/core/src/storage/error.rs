//! Storage error types.

use std::io;

use thiserror::Error;

/// File store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Name is not a single file inside the uploads directory.
    #[error("invalid file name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// File not found in the uploads directory.
    #[error("file not found: {name}")]
    NotFound {
        /// Name that was not found.
        name: String,
    },

    /// Upload body could not be read from the client.
    #[error("upload body could not be read: {source}")]
    Body {
        /// Error raised by the body reader.
        #[source]
        source: io::Error,
    },

    /// Filesystem operation failed.
    #[error("storage {op} failed: {source}")]
    Io {
        /// Operation that failed (`create`, `write`, `list`, `read`, `delete`).
        op: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Create an invalid name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a body read error.
    #[must_use]
    pub fn body(source: io::Error) -> Self {
        Self::Body { source }
    }

    /// Create an I/O error for `op`.
    #[must_use]
    pub fn io(op: &'static str, source: io::Error) -> Self {
        Self::Io { op, source }
    }

    /// Classify an OS error raised while acting on `name`.
    ///
    /// Operations act first and classify afterwards, so a missing file shows
    /// up here rather than in a separate existence check.
    #[must_use]
    pub fn classify(op: &'static str, name: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::IsADirectory => Self::not_found(name),
            io::ErrorKind::InvalidFilename => Self::invalid_name(name),
            _ => Self::io(op, source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(io::ErrorKind::NotFound)]
    #[case(io::ErrorKind::IsADirectory)]
    fn test_classify_missing_file(#[case] kind: io::ErrorKind) {
        let err = StorageError::classify("read", "a.txt", io::Error::from(kind));
        assert!(matches!(err, StorageError::NotFound { ref name } if name == "a.txt"));
    }

    #[test]
    fn test_classify_invalid_filename() {
        let err = StorageError::classify(
            "write",
            "x",
            io::Error::from(io::ErrorKind::InvalidFilename),
        );
        assert!(matches!(err, StorageError::InvalidName { .. }));
    }

    #[test]
    fn test_classify_other_errors_keep_operation() {
        let err = StorageError::classify(
            "delete",
            "a.txt",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, StorageError::Io { op: "delete", .. }));
        assert!(err.to_string().starts_with("storage delete failed"));
    }
}
