//! Error types for persistence and configuration.
//!
//! None of these are fatal to the installation: callers in the authoring and
//! driver layers log them and carry on with in-memory state.

use std::fmt;
use std::io;

/// Errors from reading or writing persisted text.
#[derive(Debug)]
pub enum StorageError {
    /// Nothing is stored under the requested key.
    NotFound(String),
    /// The backing store refused the read or write.
    Io(io::Error),
    /// A storage backend without an `io::Error` of its own (e.g. browser storage).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(key) => write!(f, "Nothing stored at '{}'", key),
            StorageError::Io(e) => write!(f, "Storage I/O failed: {}", e),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Errors from loading or saving the [`Parameters`](crate::config::Parameters) record.
#[derive(Debug)]
pub enum ConfigError {
    Storage(StorageError),
    /// The stored document is not valid JSON for the parameter record.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Storage(e) => write!(f, "Failed to access parameters: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse parameters: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Storage(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Storage(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_errors_convert_and_chain() {
        let err: StorageError = io::Error::new(io::ErrorKind::PermissionDenied, "locked").into();
        assert!(err.to_string().contains("locked"));
        assert!(err.source().is_some());
    }

    #[test]
    fn config_error_wraps_storage() {
        let err: ConfigError = StorageError::NotFound("params.json".into()).into();
        assert!(err.to_string().contains("params.json"));
        assert!(matches!(err, ConfigError::Storage(StorageError::NotFound(_))));
    }
}
