//! RDF datatype representation
//!
//! Datatypes are always explicit - there is no "untyped" literal. Plain
//! strings default to `xsd:string`, and language-tagged strings use
//! `rdf:langString`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trellis_vocab::{rdf, xsd};

/// RDF literal datatype (always an expanded IRI)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from an expanded IRI
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        Datatype(Arc::from(iri.as_ref()))
    }

    /// xsd:string - default for plain string literals
    pub fn xsd_string() -> Self {
        Self::from_iri(xsd::STRING)
    }

    /// xsd:boolean
    pub fn xsd_boolean() -> Self {
        Self::from_iri(xsd::BOOLEAN)
    }

    /// xsd:integer
    pub fn xsd_integer() -> Self {
        Self::from_iri(xsd::INTEGER)
    }

    /// xsd:long
    pub fn xsd_long() -> Self {
        Self::from_iri(xsd::LONG)
    }

    /// xsd:decimal
    pub fn xsd_decimal() -> Self {
        Self::from_iri(xsd::DECIMAL)
    }

    /// xsd:double
    pub fn xsd_double() -> Self {
        Self::from_iri(xsd::DOUBLE)
    }

    /// rdf:langString - for language-tagged literals
    pub fn rdf_lang_string() -> Self {
        Self::from_iri(rdf::LANG_STRING)
    }

    /// Get the IRI of this datatype
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is the xsd:string datatype
    pub fn is_xsd_string(&self) -> bool {
        self.as_iri() == xsd::STRING
    }

    /// Check if this is the xsd:boolean datatype
    pub fn is_boolean(&self) -> bool {
        self.as_iri() == xsd::BOOLEAN
    }

    /// Check if this is the rdf:langString datatype
    pub fn is_lang_string(&self) -> bool {
        self.as_iri() == rdf::LANG_STRING
    }

    /// Check if this belongs to the xsd:integer family (long, int, short, ...)
    pub fn is_integer(&self) -> bool {
        xsd::is_integer_type(self.as_iri())
    }

    /// Check if this is a numeric type (integer family, decimal, float, double)
    pub fn is_numeric(&self) -> bool {
        xsd::is_numeric_type(self.as_iri())
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_iri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_constructors() {
        assert_eq!(Datatype::xsd_string().as_iri(), xsd::STRING);
        assert_eq!(Datatype::xsd_boolean().as_iri(), xsd::BOOLEAN);
        assert_eq!(Datatype::xsd_integer().as_iri(), xsd::INTEGER);
        assert_eq!(Datatype::rdf_lang_string().as_iri(), rdf::LANG_STRING);
    }

    #[test]
    fn test_is_checks() {
        assert!(Datatype::xsd_string().is_xsd_string());
        assert!(!Datatype::xsd_integer().is_xsd_string());

        assert!(Datatype::rdf_lang_string().is_lang_string());

        assert!(Datatype::xsd_long().is_integer());
        assert!(!Datatype::xsd_decimal().is_integer());
        assert!(Datatype::xsd_decimal().is_numeric());
        assert!(!Datatype::xsd_string().is_numeric());
    }
}
