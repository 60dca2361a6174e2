//! Error types for data parsing in airdash-types.

use thiserror::Error;

/// Errors that can occur when parsing airdash values from text.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The value is not one of the accepted names.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A measurement record failed structural validation.
    #[error("Invalid record at index {index}: {message}")]
    InvalidRecord {
        /// Position of the record in the upstream batch.
        index: usize,
        /// What was wrong with it.
        message: String,
    },
}

/// Result type alias using airdash-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
