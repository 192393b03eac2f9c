//! Error types for the structure decoder.
//!
//! Decoding never fails; these errors only come out of the field reader.

use thiserror::Error;

/// Errors that can occur while reading a field tree from IMAP text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed IMAP syntax.
    #[error("Parse error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Lists nested deeper than the reader accepts.
    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep {
        /// The configured nesting limit.
        limit: usize,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = Error::Parse {
            position: 7,
            message: "Unexpected EOF in quoted string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at position 7: Unexpected EOF in quoted string"
        );
    }

    #[test]
    fn nesting_error_display() {
        let err = Error::NestingTooDeep { limit: 32 };
        assert_eq!(err.to_string(), "Nesting deeper than 32 levels");
    }
}
