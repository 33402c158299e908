//! Error types for rank range search.
//!
//! Building and searching never fail: bad points are dropped and bad
//! rectangles are corrected. Errors only exist where an input is rejected
//! outright, which is configuration and decoding of caller-supplied values
//! at the WebAssembly boundary.

use thiserror::Error;

/// Result type alias for rank range search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or feeding a search context.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration value out of range (PS-001).
    #[error("[PS-001] Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// Configuration could not be extracted (PS-002).
    #[error("[PS-002] Failed to load configuration: {0}")]
    ConfigLoad(String),

    /// Struct-of-arrays input with columns of different lengths (PS-003).
    #[error("[PS-003] Column '{column}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending column.
        column: &'static str,
        /// Length of the first column.
        expected: usize,
        /// Length of the offending column.
        actual: usize,
    },

    /// A caller value could not be decoded (PS-004).
    #[error("[PS-004] Failed to decode {what}: {message}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// Decoder message.
        message: String,
    },
}

impl Error {
    /// Stable error code, e.g. `PS-001`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "PS-001",
            Self::ConfigLoad(_) => "PS-002",
            Self::LengthMismatch { .. } => "PS-003",
            Self::Decode { .. } => "PS-004",
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_codes() {
        let err = Error::InvalidConfig {
            key: "leaf_size".to_string(),
            message: "value 0 is out of range [1, 4096]".to_string(),
        };
        assert_eq!(err.code(), "PS-001");
        assert_eq!(
            err.to_string(),
            "[PS-001] Invalid configuration value for 'leaf_size': value 0 is out of range [1, 4096]"
        );

        let err = Error::LengthMismatch {
            column: "ranks",
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.code(), "PS-003");
        assert_eq!(err.to_string(), "[PS-003] Column 'ranks' has 2 entries, expected 3");
    }

    #[test]
    fn test_decode_error() {
        let err = Error::Decode {
            what: "rect",
            message: "missing field `hx`".to_string(),
        };
        assert_eq!(err.code(), "PS-004");
        assert!(err.to_string().contains("missing field `hx`"));
    }
}
