//! Shape error types
//!
//! Every variant reports a defect in the shape (or in the keyword overrides
//! configured alongside it), never in request data: callers treat these as
//! fatal for the operation at hand.

use thiserror::Error;

/// Result type for shape operations
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Schema-authoring errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Alias is not a plain word
    #[error("malformed alias <{alias}> for <field({iri})>")]
    MalformedAlias { alias: String, iri: String },

    /// Alias starts with `@` or is taken by a keyword override
    #[error("reserved alias <{alias}> for <field({iri})>")]
    ReservedAlias { alias: String, iri: String },

    /// Two distinct edges resolve to the same alias
    #[error("clashing aliases for <field({first})> / <field({second})>")]
    ClashingAliases { first: String, second: String },

    /// A field carries conflicting user-defined aliases
    #[error("multiple aliases for <field({iri})> / {aliases:?}")]
    MultipleAliases { iri: String, aliases: Vec<String> },

    /// No alias can be derived from the field IRI
    #[error("undefined alias for <field({iri})>")]
    UndefinedAlias { iri: String },

    /// A guard survived redaction
    #[error("unredacted guard <{0}>")]
    UnredactedGuard(String),

    /// Invalid regex in a pattern constraint
    #[error("invalid regex pattern '{pattern}': {message}")]
    MalformedPattern { pattern: String, message: String },

    /// Keyword override for a name that isn't an aliasable keyword
    #[error("unknown keyword <{0}>")]
    UnknownKeyword(String),

    /// Keyword override with an invalid alias
    #[error("malformed alias <{alias}> for keyword <{keyword}>")]
    MalformedKeywordAlias { keyword: String, alias: String },

    /// Two keywords overridden with the same alias
    #[error("conflicting aliases for JSON-LD keywords <{first}> / <{second}>")]
    ConflictingKeywordAliases { first: String, second: String },
}
