use thiserror::Error;
use trellis_shape::ShapeError;

/// Decoding errors
///
/// Every variant except [`DecodeError::Shape`] reports malformed request
/// data; `Shape` reports a defect in the schema and is fatal.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("conflicting <@id> <{found}>: expected <{expected}>")]
    ConflictingId { expected: String, found: String },

    #[error("conflicting <{keyword}> values <{first}> / <{second}>")]
    ConflictingKeyword {
        keyword: String,
        first: String,
        second: String,
    },

    #[error("unknown field <{0}>")]
    UnknownField(String),

    #[error("malformed <{keyword}> value: expected string")]
    MalformedKeyword { keyword: String },

    #[error("unexpected value <{value}> at <{path}>")]
    UnexpectedValue { path: String, value: String },

    #[error("nested array at <{0}>")]
    NestedArray(String),

    #[error("literal value <{value}> for inverse field <{field}>")]
    InverseLiteral { field: String, value: String },

    #[error("undefined language tag for plain string <{0}>")]
    UnknownLanguage(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl DecodeError {
    /// Check if the error reports a schema defect rather than a bad request
    pub fn is_fatal(&self) -> bool {
        matches!(self, DecodeError::Shape(_))
    }
}

/// Encoding and validation errors: schema defects only
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
