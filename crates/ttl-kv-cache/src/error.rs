//! Error types for the cache storage layer

use std::fmt;

/// Errors raised by storage backends. Callers of [`crate::TtlCache`] never
/// see these; the cache logs them and reports a miss instead.
#[derive(Debug)]
pub enum CacheError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io(e) => write!(f, "storage I/O error: {}", e),
            CacheError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(e) => Some(e),
            CacheError::Serialization(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        CacheError::Io(e)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_display() {
        let err = CacheError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(format!("{}", err).starts_with("storage I/O error"));
    }

    #[test]
    fn test_serialization_error_source() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = CacheError::from(json_err);
        assert!(err.source().is_some());
    }
}
