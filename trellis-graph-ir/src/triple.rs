//! RDF triple (statement)

use crate::Term;
use serde::{Deserialize, Serialize};

/// A subject-predicate-object statement
///
/// The subject is a resource (IRI or blank node) and the predicate is an IRI;
/// constructors don't enforce this, producers do.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Predicate IRI (empty for malformed triples with a non-IRI predicate)
    pub fn predicate_iri(&self) -> &str {
        self.predicate.as_iri().unwrap_or_default()
    }

    /// Check if this triple links `source` to some value through `iri`,
    /// following the edge forward or, for `inverse`, backward
    pub fn traverses(&self, source: &Term, iri: &str, inverse: bool) -> bool {
        self.predicate_iri() == iri
            && if inverse {
                &self.object == source
            } else {
                &self.subject == source
            }
    }

    /// The far end of an edge traversed with [`Triple::traverses`]
    pub fn target(&self, inverse: bool) -> &Term {
        if inverse {
            &self.subject
        } else {
            &self.object
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
