//! Error types for the edkconst-core library.
//!
//! Fatal parse conditions ([`Error::ParseFailure`], [`Error::UnsupportedContinuation`]) abort
//! the source being ingested. [`Error::MalformedLiteral`] is only fatal where a value is
//! structurally required; in `#define` context it is swallowed by the parser.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for edkconst operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all edkconst operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to open or read a header source
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line did not match any pattern the classifier accepts in its current state
    #[error("{source_name}:{line_number}: {reason}: {line}")]
    ParseFailure {
        /// Name of the source being parsed
        source_name: String,
        /// 1-based line number
        line_number: usize,
        /// The offending line, without its line terminator
        line: String,
        /// What went wrong
        reason: String,
    },

    /// A bitwise-OR expression continued past its second physical line
    #[error("{source_name}:{line_number}: bitwise-OR expression spans more than two lines: {line}")]
    UnsupportedContinuation {
        /// Name of the source being parsed
        source_name: String,
        /// 1-based line number of the second continuation
        line_number: usize,
        /// The offending line, without its line terminator
        line: String,
    },

    /// Token is not an integer literal
    #[error("malformed integer literal '{token}'")]
    MalformedLiteral {
        /// The token that failed to parse
        token: String,
    },

    /// Lookup of an unregistered constant name
    #[error("constant '{name}' not found")]
    NotFound {
        /// The name that was looked up
        name: String,
    },

    /// A status code returned by the native layer did not signal success
    #[error("{message}")]
    Status {
        /// Rendered diagnostic message
        message: String,
        /// The raw status code
        code: i64,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new malformed literal error
    pub fn malformed_literal(token: impl Into<String>) -> Self {
        Self::MalformedLiteral {
            token: token.into(),
        }
    }

    /// Creates a new not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Returns true if parsing may skip past this error and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedLiteral { .. })
    }

    /// Returns true if this error aborted the parse of a source
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::ParseFailure { .. } | Self::UnsupportedContinuation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ParseFailure {
            source_name: "edk.h".to_string(),
            line_number: 12,
            line: "#define A B C".to_string(),
            reason: "unexpected #define arity".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "edk.h:12: unexpected #define arity: #define A B C"
        );
        assert!(Error::not_found("EDK_OK").to_string().contains("EDK_OK"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::malformed_literal("0xZZ").is_recoverable());
        assert!(!Error::not_found("X").is_recoverable());
        assert!(!Error::malformed_literal("0xZZ").is_parse_error());

        let err = Error::UnsupportedContinuation {
            source_name: "edk.h".to_string(),
            line_number: 3,
            line: "B |".to_string(),
        };
        assert!(err.is_parse_error());
        assert!(!err.is_recoverable());
    }
}
