//! Structural probes over driven shapes
//!
//! Each probe is an exhaustive match: logical connectives and transparent
//! wrappers are traversed, nested fields are not.

use crate::shape::{Field, Shape, ALIAS};
use std::collections::BTreeSet;
use trellis_vocab::{internal, rdf};

/// The datatype the shape pins down, if it declares exactly one
///
/// Conjunctions keep the narrowest of compatible datatypes, so an explicit
/// `iri` datatype wins over an inferred `resource` one.
pub fn datatype(shape: &Shape) -> Option<&str> {
    match shape {
        Shape::Datatype(iri) => Some(iri),
        Shape::And(shapes) => narrowest(shapes.iter().filter_map(datatype)),
        Shape::Or(shapes) => unique(shapes.iter().filter_map(datatype)),
        Shape::When(when) => unique([&when.pass, &when.fail].into_iter().filter_map(datatype)),
        Shape::Link(link) => datatype(&link.shape),
        _ => None,
    }
}

/// The class the shape pins down, if it declares exactly one
pub fn clazz(shape: &Shape) -> Option<&str> {
    match shape {
        Shape::Clazz(iri) => Some(iri),
        Shape::And(shapes) | Shape::Or(shapes) => unique(shapes.iter().filter_map(clazz)),
        Shape::When(when) => unique([&when.pass, &when.fail].into_iter().filter_map(clazz)),
        Shape::Link(link) => clazz(&link.shape),
        _ => None,
    }
}

fn narrowest<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let distinct: BTreeSet<&str> = values.collect();

    unique(
        distinct
            .iter()
            .copied()
            .filter(|general| !distinct.iter().any(|specific| subsumes(general, specific))),
    )
}

fn subsumes(general: &str, specific: &str) -> bool {
    general != specific
        && match general {
            internal::VALUE => true,
            internal::RESOURCE => specific == internal::IRI || specific == internal::BNODE,
            internal::LITERAL => !specific.starts_with(internal::NAMESPACE),
            _ => false,
        }
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let distinct: BTreeSet<&str> = values.collect();

    if distinct.len() == 1 {
        distinct.into_iter().next()
    } else {
        None
    }
}

/// Lower bound on the number of values
pub fn min_count(shape: &Shape) -> Option<usize> {
    match shape {
        Shape::MinCount(limit) => Some(*limit),
        Shape::And(shapes) => shapes.iter().filter_map(min_count).max(),
        Shape::Or(shapes) => shapes.iter().filter_map(min_count).min(),
        Shape::When(when) => [&when.pass, &when.fail].into_iter().filter_map(min_count).min(),
        Shape::Link(link) => min_count(&link.shape),
        _ => None,
    }
}

/// Upper bound on the number of values
pub fn max_count(shape: &Shape) -> Option<usize> {
    match shape {
        Shape::MaxCount(limit) => Some(*limit),
        Shape::And(shapes) => shapes.iter().filter_map(max_count).min(),
        Shape::Or(shapes) => shapes.iter().filter_map(max_count).max(),
        Shape::When(when) => [&when.pass, &when.fail].into_iter().filter_map(max_count).max(),
        Shape::Link(link) => max_count(&link.shape),
        _ => None,
    }
}

/// Fields reachable without crossing another field, in encounter order
pub fn fields(shape: &Shape) -> Vec<&Field> {
    let mut found = Vec::new();
    collect_fields(shape, &mut found);
    found
}

fn collect_fields<'a>(shape: &'a Shape, found: &mut Vec<&'a Field>) {
    match shape {
        Shape::Field(field) => found.push(field),
        Shape::And(shapes) | Shape::Or(shapes) => {
            for shape in shapes {
                collect_fields(shape, found);
            }
        }
        Shape::When(when) => {
            collect_fields(&when.pass, found);
            collect_fields(&when.fail, found);
        }
        Shape::Link(link) => collect_fields(&link.shape, found),
        _ => {}
    }
}

/// User-defined aliases (`meta("alias", ..)`) annotating the shape
pub fn aliases(shape: &Shape) -> BTreeSet<&str> {
    match shape {
        Shape::Meta { label, value } if label == ALIAS => BTreeSet::from([value.as_str()]),
        Shape::And(shapes) | Shape::Or(shapes) => shapes.iter().flat_map(aliases).collect(),
        Shape::When(when) => aliases(&when.pass)
            .into_iter()
            .chain(aliases(&when.fail))
            .collect(),
        Shape::Link(link) => aliases(&link.shape),
        _ => BTreeSet::new(),
    }
}

/// Language tags the shape admits, if it restricts them
///
/// Conjunctions intersect the restricted sets, alternatives unite them.
/// An empty set means "any language, but tagged".
pub fn langs(shape: &Shape) -> Option<BTreeSet<&str>> {
    match shape {
        Shape::Lang(tags) => Some(tags.iter().map(String::as_str).collect()),
        Shape::And(shapes) => shapes.iter().filter_map(langs).reduce(|x, y| {
            if x.is_empty() {
                y
            } else if y.is_empty() {
                x
            } else {
                x.intersection(&y).copied().collect()
            }
        }),
        Shape::Or(shapes) => shapes
            .iter()
            .filter_map(langs)
            .reduce(|x, y| x.union(&y).copied().collect()),
        Shape::When(when) => [&when.pass, &when.fail]
            .into_iter()
            .filter_map(langs)
            .reduce(|x, y| x.union(&y).copied().collect()),
        Shape::Link(link) => langs(&link.shape),
        _ => None,
    }
}

/// The single language tag the shape pins down, if any
pub fn lang(shape: &Shape) -> Option<&str> {
    langs(shape)
        .filter(|tags| tags.len() == 1)
        .and_then(|tags| tags.into_iter().next())
}

/// Check if the shape requires at most one value per language
pub fn localized(shape: &Shape) -> bool {
    match shape {
        Shape::Localized => true,
        Shape::And(shapes) | Shape::Or(shapes) => shapes.iter().any(localized),
        Shape::When(when) => localized(&when.pass) || localized(&when.fail),
        Shape::Link(link) => localized(&link.shape),
        _ => false,
    }
}

/// Check if the shape describes language-tagged literals
pub fn tagged(shape: &Shape) -> bool {
    datatype(shape) == Some(rdf::LANG_STRING) || langs(shape).is_some() || localized(shape)
}
