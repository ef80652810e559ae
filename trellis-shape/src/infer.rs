//! Constraint inference
//!
//! Makes implied constraints explicit so the codecs can rely on structural
//! probes alone: a `range` bounds the value count, a `clazz` implies
//! resources, nested objects are resources, and so on.

use crate::probe;
use crate::shape::{Field, Shape, Value};
use std::collections::BTreeSet;
use trellis_graph_ir::value;
use trellis_vocab::{internal, rdf, xsd};

/// Expand a shape with the constraints its parts imply
pub fn expand(shape: &Shape) -> Shape {
    match shape {
        Shape::And(shapes) => Shape::and(shapes.iter().map(expand)),
        Shape::Or(shapes) => Shape::or(shapes.iter().map(expand)),
        Shape::When(when) => Shape::when(expand(&when.test), expand(&when.pass), expand(&when.fail)),

        Shape::Field(field) => expand_field(field),
        Shape::Link(link) => Shape::link(link.iri.as_ref(), expand(&link.shape)),

        Shape::Datatype(iri) if iri.as_ref() == xsd::BOOLEAN => Shape::and([
            shape.clone(),
            Shape::max_count(1),
            Shape::range([false, true]),
        ]),

        Shape::Clazz(_) => Shape::and([shape.clone(), Shape::datatype(internal::RESOURCE)]),

        Shape::Range(values) => {
            let mut implied = vec![shape.clone(), Shape::max_count(values.len())];
            if let Some(datatype) = shared_datatype(values) {
                implied.push(Shape::datatype(datatype));
            }
            Shape::and(implied)
        }

        Shape::All(values) => Shape::and([shape.clone(), Shape::min_count(values.len())]),
        Shape::Any(_) => Shape::and([shape.clone(), Shape::min_count(1)]),

        Shape::Lang(_) | Shape::Localized => {
            Shape::and([shape.clone(), Shape::datatype(rdf::LANG_STRING)])
        }

        _ => shape.clone(),
    }
}

fn expand_field(field: &Field) -> Shape {
    let nested = expand(&field.shape);

    let resource = probe::datatype(&nested).is_none()
        && (field.inverse || field.iri.as_ref() == rdf::TYPE || !probe::fields(&nested).is_empty());

    if resource {
        field.with_shape(Shape::and([nested, Shape::datatype(internal::RESOURCE)]))
    } else {
        field.with_shape(nested)
    }
}

fn shared_datatype(values: &BTreeSet<Value>) -> Option<&str> {
    let types: BTreeSet<&str> = values
        .iter()
        .map(|v| match v {
            Value::Term(term) => value::type_of(term),
            Value::Focus(_) => internal::IRI,
        })
        .collect();

    if types.len() == 1 {
        types.into_iter().next()
    } else {
        None
    }
}
