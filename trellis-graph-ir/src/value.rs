//! Value classification and comparison
//!
//! Shapes constrain values through datatype membership and ordering; both
//! are defined here over plain [`Term`]s so every consumer agrees on them.

use crate::Term;
use bigdecimal::BigDecimal;
use std::cmp::Ordering;
use std::str::FromStr;
use trellis_vocab::{internal, xsd};

/// The datatype a value carries: the abstract `iri`/`bnode` types for
/// resources, the declared datatype for literals
pub fn type_of(value: &Term) -> &str {
    match value {
        Term::Iri(_) => internal::IRI,
        Term::BlankNode(_) => internal::BNODE,
        Term::Literal { datatype, .. } => datatype.as_iri(),
    }
}

/// Check if a value belongs to a datatype
///
/// Abstract datatypes test the value kind; concrete datatypes also require
/// the lexical form to convert to a value of that type.
pub fn is(value: &Term, datatype: &str) -> bool {
    match datatype {
        internal::VALUE => true,
        internal::RESOURCE => value.is_resource(),
        internal::LITERAL => value.is_literal(),
        _ => type_of(value) == datatype && is_well_formed(value),
    }
}

/// Check that a literal's lexical form converts to its datatype's value space
///
/// Resources and datatypes without a known value space are always well formed.
pub fn is_well_formed(value: &Term) -> bool {
    let Some((lexical, datatype, _)) = value.as_literal() else {
        return true;
    };

    let iri = datatype.as_iri();

    if iri == xsd::BOOLEAN {
        boolean(lexical).is_some()
    } else if xsd::is_integer_type(iri) {
        integer(lexical).is_some()
    } else if iri == xsd::DECIMAL {
        decimal(lexical).is_some()
    } else if iri == xsd::DOUBLE || iri == xsd::FLOAT {
        double(lexical).is_some()
    } else {
        true
    }
}

/// Parse an xsd:boolean lexical form
pub fn boolean(lexical: &str) -> Option<bool> {
    match lexical {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an xsd:integer lexical form
pub fn integer(lexical: &str) -> Option<BigDecimal> {
    let digits = lexical.strip_prefix(['+', '-']).unwrap_or(lexical);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    BigDecimal::from_str(lexical).ok()
}

/// Parse an xsd:decimal lexical form
pub fn decimal(lexical: &str) -> Option<BigDecimal> {
    let unsigned = lexical.strip_prefix(['+', '-']).unwrap_or(lexical);

    let valid = !unsigned.is_empty()
        && unsigned != "."
        && unsigned.bytes().filter(|&b| b == b'.').count() <= 1
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.');

    if valid {
        BigDecimal::from_str(lexical).ok()
    } else {
        None
    }
}

/// Parse an xsd:double lexical form
pub fn double(lexical: &str) -> Option<f64> {
    match lexical {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => f64::from_str(lexical).ok().filter(|d| d.is_finite()),
    }
}

/// Compare two values
///
/// Numbers compare by value across the numeric datatypes, booleans as
/// false < true, other literals of the same datatype and language lexically,
/// resources by identifier. Returns `None` for incomparable values.
pub fn compare(x: &Term, y: &Term) -> Option<Ordering> {
    match (x, y) {
        (Term::Iri(a), Term::Iri(b)) => Some(a.cmp(b)),
        (Term::BlankNode(a), Term::BlankNode(b)) => Some(a.cmp(b)),
        (
            Term::Literal {
                lexical: a,
                datatype: da,
                language: la,
            },
            Term::Literal {
                lexical: b,
                datatype: db,
                language: lb,
            },
        ) => {
            if da.is_numeric() && db.is_numeric() {
                compare_numbers(a, b)
            } else if da != db || la != lb {
                None
            } else if da.is_boolean() {
                Some(boolean(a)?.cmp(&boolean(b)?))
            } else {
                Some(a.cmp(b))
            }
        }
        _ => None,
    }
}

fn compare_numbers(a: &str, b: &str) -> Option<Ordering> {
    match (decimal_or_integer(a), decimal_or_integer(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => double(a)?.partial_cmp(&double(b)?),
    }
}

fn decimal_or_integer(lexical: &str) -> Option<BigDecimal> {
    integer(lexical).or_else(|| decimal(lexical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Datatype;

    #[test]
    fn test_abstract_membership() {
        let iri = Term::iri("http://example.org/x");
        let blank = Term::blank("b0");
        let literal = Term::string("x");

        assert!(is(&iri, internal::IRI));
        assert!(is(&iri, internal::RESOURCE));
        assert!(!is(&iri, internal::BNODE));
        assert!(!is(&iri, internal::LITERAL));

        assert!(is(&blank, internal::BNODE));
        assert!(is(&blank, internal::RESOURCE));

        assert!(is(&literal, internal::LITERAL));
        assert!(is(&literal, internal::VALUE));
        assert!(is(&literal, xsd::STRING));
        assert!(!is(&literal, internal::RESOURCE));
    }

    #[test]
    fn test_concrete_membership_requires_conversion() {
        assert!(is(&Term::integer(10), xsd::INTEGER));
        assert!(!is(&Term::typed("ten", Datatype::xsd_integer()), xsd::INTEGER));
        assert!(!is(&Term::typed("maybe", Datatype::xsd_boolean()), xsd::BOOLEAN));
        assert!(is(&Term::decimal("1.5"), xsd::DECIMAL));
        assert!(!is(&Term::decimal("1.5.0"), xsd::DECIMAL));
        assert!(!is(&Term::integer(1), xsd::DECIMAL));
    }

    #[test]
    fn test_numeric_comparison_across_datatypes() {
        assert_eq!(
            compare(&Term::integer(2), &Term::decimal("10.0")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(&Term::long(5), &Term::integer(5)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare(&Term::typed("1e3", Datatype::xsd_double()), &Term::integer(999)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_incomparable_values() {
        assert_eq!(compare(&Term::string("a"), &Term::integer(1)), None);
        assert_eq!(compare(&Term::iri("http://a"), &Term::string("a")), None);
        assert_eq!(
            compare(&Term::lang_string("a", "en"), &Term::lang_string("b", "fr")),
            None
        );
        assert_eq!(
            compare(&Term::string("abc"), &Term::string("abd")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(&Term::boolean(false), &Term::boolean(true)),
            Some(Ordering::Less)
        );
    }
}
