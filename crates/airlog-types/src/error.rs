//! Error types for airlog-types.

use thiserror::Error;

/// Error returned when a sensor kind key cannot be parsed.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseKindError {
    /// The string is not one of the known sensor kind keys.
    #[error("unknown sensor kind: {0}")]
    UnknownKind(String),
}

/// Result type alias using airlog-types' ParseKindError type.
pub type ParseResult<T> = std::result::Result<T, ParseKindError>;
