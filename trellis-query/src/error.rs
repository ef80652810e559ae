//! Error types for query parsing

use thiserror::Error;
use trellis_json_ld::DecodeError;
use trellis_shape::ShapeError;

/// Query parsing errors
///
/// [`ParseError::Shape`] reports a defect in the schema; every other
/// variant reports a malformed request.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Malformed JSON filter
    #[error("malformed JSON query: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON that isn't a valid query
    #[error("malformed query: {0}")]
    Syntax(String),

    /// Path step not covered by the shape
    #[error("unknown path step <{0}>")]
    NotFound(String),

    #[error("invalid offset: {0}")]
    InvalidOffset(String),

    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// Filter value not decodable against the shape
    #[error("malformed filter value: {0}")]
    Decode(DecodeError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl ParseError {
    /// Check if the error reports a schema defect rather than a bad request
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::Shape(_))
    }
}

impl From<DecodeError> for ParseError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::Shape(error) => ParseError::Shape(error),
            error => ParseError::Decode(error),
        }
    }
}

/// Result type for query parsing
pub type Result<T> = std::result::Result<T, ParseError>;
