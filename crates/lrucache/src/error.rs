//! Error types for lrucache

use std::fmt;

/// Result type alias for lrucache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction
///
/// Lookups that miss, duplicate inserts and evicting an empty cache are
/// ordinary outcomes and never produce an `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied argument is out of range (e.g. a zero capacity)
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn non_positive_capacity() -> Self {
        Error::InvalidArgument("max size must be a positive integer".to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::non_positive_capacity();
        assert_eq!(
            err.to_string(),
            "Invalid argument: max size must be a positive integer"
        );
    }
}
