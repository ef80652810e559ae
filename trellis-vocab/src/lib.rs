//! RDF vocabulary constants for Trellis
//!
//! This crate provides a centralized location for the vocabulary IRIs used
//! by the shape, codec and query crates.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `internal` - abstract datatypes classifying values by kind (app:/terms#)
//! - `keywords` - JSON-LD keywords subject to user-defined aliasing

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:value IRI
    pub const VALUE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#value";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

    /// rdfs:Resource IRI
    pub const RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:short IRI
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";

    /// xsd:byte IRI
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";

    /// xsd:nonNegativeInteger IRI
    pub const NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";

    /// xsd:positiveInteger IRI
    pub const POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#positiveInteger";

    /// xsd:nonPositiveInteger IRI
    pub const NON_POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";

    /// xsd:negativeInteger IRI
    pub const NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#negativeInteger";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    /// Check if a datatype IRI belongs to the xsd:integer family
    pub fn is_integer_type(iri: &str) -> bool {
        matches!(
            iri,
            INTEGER
                | LONG
                | INT
                | SHORT
                | BYTE
                | NON_NEGATIVE_INTEGER
                | POSITIVE_INTEGER
                | NON_POSITIVE_INTEGER
                | NEGATIVE_INTEGER
        )
    }

    /// Check if a datatype IRI is a decimal or floating point type
    pub fn is_decimal_type(iri: &str) -> bool {
        matches!(iri, DECIMAL | FLOAT | DOUBLE)
    }

    /// Check if a datatype IRI is numeric
    pub fn is_numeric_type(iri: &str) -> bool {
        is_integer_type(iri) || is_decimal_type(iri)
    }
}

/// Abstract datatypes classifying values by kind rather than by lexical space
///
/// These never appear on stored literals; shapes use them to state that a
/// field holds resources, blank nodes, IRIs or literals of any type.
pub mod internal {
    /// Namespace of the abstract datatypes
    pub const NAMESPACE: &str = "app:/terms#";

    /// Any IRI reference
    pub const IRI: &str = "app:/terms#iri";

    /// Any blank node
    pub const BNODE: &str = "app:/terms#bnode";

    /// Any literal
    pub const LITERAL: &str = "app:/terms#literal";

    /// Any resource (IRI or blank node)
    pub const RESOURCE: &str = "app:/terms#resource";

    /// Any value at all
    pub const VALUE: &str = "app:/terms#value";

    /// Check if an abstract datatype admits resources only
    pub fn is_resource_type(iri: &str) -> bool {
        matches!(iri, RESOURCE | BNODE | IRI)
    }
}

/// JSON-LD keywords
pub mod keywords {
    /// `@context`
    pub const CONTEXT: &str = "@context";

    /// `@id`
    pub const ID: &str = "@id";

    /// `@type`
    pub const TYPE: &str = "@type";

    /// `@value`
    pub const VALUE: &str = "@value";

    /// `@language`
    pub const LANGUAGE: &str = "@language";

    /// `@reverse` (context only)
    pub const REVERSE: &str = "@reverse";

    /// `@container` (context only)
    pub const CONTAINER: &str = "@container";

    /// Keywords that may be renamed by user-defined aliases
    pub const ALIASABLE: [&str; 5] = [CONTEXT, ID, TYPE, VALUE, LANGUAGE];
}
