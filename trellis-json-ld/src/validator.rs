//! Shape-driven JSON-LD validator
//!
//! Checks a compacted JSON-LD object against a driver shape before decoding,
//! collecting every failure in a [`Trace`] nested like the JSON itself.
//! Values are read the way the [`Decoder`] reads them, so a payload that
//! validates also decodes.

use crate::constraints;
use crate::decoder::Decoder;
use crate::error::{CodecError, DecodeError};
use serde_json::Value as JsonValue;
use trellis_graph_ir::Term;
use trellis_shape::{aliases, probe, Aliases, Keywords, Shape, ShapeError, Trace};

type Result<T> = std::result::Result<T, ShapeError>;

/// Validator over a single focus resource
pub struct Validator<'a> {
    decoder: Decoder<'a>,
    keywords: &'a Keywords,
}

impl<'a> Validator<'a> {
    pub fn new(focus: &str, keywords: &'a Keywords) -> Self {
        Self {
            decoder: Decoder::new(focus, keywords),
            keywords,
        }
    }

    /// Validate the description of the focus resource
    ///
    /// Returns the empty trace on success; schema defects are errors.
    pub fn validate(&self, shape: &Shape, json: &JsonValue) -> std::result::Result<Trace, CodecError> {
        let focus = Term::iri(self.decoder.focus());

        let issues = match self.decoder.root(shape, json) {
            Ok(_) => Trace::new(),
            Err(DecodeError::Shape(error)) => return Err(error.into()),
            Err(error) => Trace::issue(error.to_string()),
        };

        Ok(self.group(shape, &[json], vec![focus], issues)?)
    }

    /// Validate a group of JSON values sharing a shape
    fn group(&self, shape: &Shape, values: &[&JsonValue], terms: Vec<Term>, issues: Trace) -> Result<Trace> {
        let aliases = aliases(shape, self.keywords)?;
        let trace = self.shape(shape, &aliases, values, &terms)?;

        Ok(issues.merge(trace).merge(self.envelope(shape, &aliases, values)))
    }

    /// The terms a group of JSON values stands for
    ///
    /// Values the decoder rejects are reported and left out.
    fn terms(&self, shape: &Shape, values: &[&JsonValue], path: &str) -> Result<(Vec<Term>, Trace)> {
        let mut terms: Vec<Term> = Vec::new();
        let mut issues = Vec::new();

        for (index, value) in values.iter().enumerate() {
            let path = format!("{}/{}", path, index);

            let decoded = match value {
                JsonValue::Object(object) => match self.decoder.subject(shape, object) {
                    Ok(Some(subject)) => Ok(vec![subject]),
                    Ok(None) => self.decoded(shape, value, &path),
                    Err(error) => Err(error),
                },
                JsonValue::Array(_) => Err(DecodeError::NestedArray(path.clone())),
                _ => self.decoded(shape, value, &path),
            };

            match decoded {
                Ok(decoded) => {
                    for term in decoded {
                        if !terms.contains(&term) {
                            terms.push(term);
                        }
                    }
                }
                Err(DecodeError::Shape(error)) => return Err(error),
                Err(error) => issues.push(error.to_string()),
            }
        }

        Ok((terms, Trace::issues(issues)))
    }

    fn decoded(&self, shape: &Shape, value: &JsonValue, path: &str) -> crate::error::Result<Vec<Term>> {
        Ok(self
            .decoder
            .values(shape, value, path)?
            .into_iter()
            .map(|(term, _)| term)
            .collect())
    }

    fn shape(&self, shape: &Shape, aliases: &Aliases, values: &[&JsonValue], terms: &[Term]) -> Result<Trace> {
        match shape {
            Shape::And(shapes) => shapes
                .iter()
                .map(|shape| self.shape(shape, aliases, values, terms))
                .collect(),

            Shape::Or(shapes) => {
                for shape in shapes {
                    if self.shape(shape, aliases, values, terms)?.is_empty() {
                        return Ok(Trace::new());
                    }
                }
                Ok(Trace::issue("values don't match any alternative"))
            }

            Shape::When(when) => {
                let branch = if self.shape(&when.test, aliases, values, terms)?.is_empty() {
                    &when.pass
                } else {
                    &when.fail
                };
                self.shape(branch, aliases, values, terms)
            }

            Shape::Link(link) => self.shape(&link.shape, aliases, values, terms),

            Shape::Field(field) => {
                let alias = aliases.alias_of(field).ok_or_else(|| ShapeError::UndefinedAlias {
                    iri: field.to_string(),
                })?;

                tracing::trace!(field = %field, alias, "validating field");

                let mut trace = Trace::new();

                for value in values {
                    let nested: Vec<&JsonValue> = match value {
                        JsonValue::Object(object) => match object.get(alias) {
                            Some(JsonValue::Array(items)) => items.iter().collect(),
                            Some(JsonValue::Null) | None => Vec::new(),
                            Some(value) => vec![value],
                        },

                        // a reference decodes to a resource with an empty description
                        JsonValue::String(_) => Vec::new(),

                        // decodes to nothing
                        JsonValue::Null => continue,

                        other => {
                            trace = trace.merge(Trace::issue(format!("{} is not a structured object", other)));
                            continue;
                        }
                    };

                    let (terms, issues) = self.terms(&field.shape, &nested, &format!("/{}", alias))?;
                    let nested = self.group(&field.shape, &nested, terms, issues)?;

                    trace = trace.merge(Trace::field(alias, nested));
                }

                Ok(trace)
            }

            shape => constraints::check(shape, self.decoder.focus(), terms),
        }
    }

    /// Report properties that are neither keywords nor known field aliases
    fn envelope(&self, shape: &Shape, aliases: &Aliases, values: &[&JsonValue]) -> Trace {
        if probe::tagged(shape) {
            return Trace::new();
        }

        values
            .iter()
            .filter_map(|value| value.as_object())
            .flat_map(|object| object.keys())
            .filter(|name| {
                !(name.starts_with('@') || self.keywords.is_reserved(name) || aliases.contains(name))
            })
            .map(|name| Trace::field(name.as_str(), Trace::issue("unexpected field")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use trellis_shape::drive;
    use trellis_vocab::{rdf, rdfs, xsd};

    const FOCUS: &str = "https://example.com/people/alice";
    const VALUE: &str = rdf::VALUE;
    const KNOWS: &str = "https://example.com/terms#knows";

    fn validate(shape: &Shape, json: JsonValue) -> Trace {
        let keywords = Keywords::new();
        Validator::new(FOCUS, &keywords).validate(&drive(shape), &json).unwrap()
    }

    // =========================================================================
    // Cardinality
    // =========================================================================

    #[test]
    fn test_min_count() {
        let shape = Shape::field(VALUE, Shape::min_count(2));

        let trace = validate(&shape, json!({ "value": ["a"] }));

        assert_eq!(
            trace.get("value").unwrap().messages(),
            ["value count is not greater than or equal to 2"]
        );
        assert!(validate(&shape, json!({ "value": ["a", "b"] })).is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let shape = Shape::field(rdfs::LABEL, Shape::required());

        let trace = validate(&shape, json!({}));

        assert_eq!(
            trace.get("label").unwrap().messages(),
            ["value count is not greater than or equal to 1"]
        );
    }

    // =========================================================================
    // Values
    // =========================================================================

    #[test]
    fn test_values_are_typed_like_the_decoder_types_them() {
        let shape = Shape::field(rdfs::LABEL, Shape::and([Shape::datatype(xsd::INTEGER), Shape::max_inclusive(10i64)]));

        assert!(validate(&shape, json!({ "label": 5 })).is_empty());

        let trace = validate(&shape, json!({ "label": [5, 11] }));
        assert_eq!(trace.get("label").unwrap().messages().len(), 1);
    }

    #[test]
    fn test_undecodable_values_are_reported() {
        let shape = Shape::field(rdfs::LABEL, Shape::and([]));

        let trace = validate(&shape, json!({ "label": [["nested"]] }));

        assert_eq!(trace.get("label").unwrap().messages(), ["nested array at </label/0>"]);
    }

    #[test]
    fn test_alternatives() {
        let shape = Shape::field(
            rdfs::LABEL,
            Shape::or([Shape::datatype(xsd::BOOLEAN), Shape::datatype(xsd::INTEGER)]),
        );

        assert!(validate(&shape, json!({ "label": true })).is_empty());
        assert_eq!(
            validate(&shape, json!({ "label": { "@value": "x" } }))
                .get("label")
                .unwrap()
                .messages(),
            ["values don't match any alternative"]
        );
    }

    #[test]
    fn test_conditionals() {
        let shape = Shape::field(
            rdfs::LABEL,
            Shape::when(Shape::datatype(xsd::INTEGER), Shape::min_inclusive(0i64), Shape::min_length(3)),
        );

        assert!(validate(&shape, json!({ "label": 1 })).is_empty());
        assert!(!validate(&shape, json!({ "label": -1 })).is_empty());
        assert!(validate(&shape, json!({ "label": "abc" })).is_empty());
        assert!(!validate(&shape, json!({ "label": "ab" })).is_empty());
    }

    // =========================================================================
    // Structure
    // =========================================================================

    #[test]
    fn test_nested_traces() {
        let shape = Shape::field(KNOWS, Shape::field(rdfs::LABEL, Shape::required()));

        let trace = validate(
            &shape,
            json!({ "knows": [{ "@id": "/people/bob", "label": "Bob" }, { "@id": "/people/carol" }] }),
        );

        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            json!({
                "fields": {
                    "knows": {
                        "fields": {
                            "label": { "issues": ["value count is not greater than or equal to 1"] }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_references_have_empty_descriptions() {
        let shape = Shape::field(KNOWS, Shape::field(rdfs::LABEL, Shape::required()));

        let trace = validate(&shape, json!({ "knows": "/people/bob" }));

        assert_eq!(
            trace.get("knows").unwrap().get("label").unwrap().messages(),
            ["value count is not greater than or equal to 1"]
        );

        let optional = Shape::field(KNOWS, Shape::field(rdfs::LABEL, Shape::optional()));
        assert!(validate(&optional, json!({ "knows": ["/people/bob"] })).is_empty());
    }

    #[test]
    fn test_root_ids_must_match_the_focus() {
        let shape = Shape::field(rdfs::LABEL, Shape::and([]));

        assert!(validate(&shape, json!({ "@id": "/people/alice", "label": "x" })).is_empty());

        let conflicting = validate(&shape, json!({ "@id": "/people/bob", "label": "x" }));
        assert_eq!(
            conflicting.messages(),
            [DecodeError::ConflictingId {
                expected: FOCUS.to_string(),
                found: "https://example.com/people/bob".to_string(),
            }
            .to_string()]
        );

        let malformed = validate(&shape, json!({ "@id": 1, "label": "x" }));
        assert_eq!(malformed.messages(), ["malformed <@id> value: expected string"]);
    }

    #[test]
    fn test_unexpected_fields() {
        let shape = Shape::field(KNOWS, Shape::field(rdfs::LABEL, Shape::and([])));

        let trace = validate(
            &shape,
            json!({ "@id": FOCUS, "name": "Alice", "knows": { "label": "Bob", "age": 42 } }),
        );

        assert_eq!(trace.get("name").unwrap().messages(), ["unexpected field"]);
        assert_eq!(
            trace.get("knows").unwrap().get("age").unwrap().messages(),
            ["unexpected field"]
        );
        assert!(trace.get("knows").unwrap().get("label").is_none());
    }

    #[test]
    fn test_tagged_maps_have_no_envelope() {
        let shape = Shape::field(rdfs::LABEL, Shape::localized());

        assert!(validate(&shape, json!({ "label": { "en": "one", "it": "uno" } })).is_empty());

        let trace = validate(&shape, json!({ "label": { "en": ["one", "two"] } }));
        assert_eq!(
            trace.get("label").unwrap().messages(),
            ["multiple values for <en> language tag"]
        );
    }

    #[test]
    fn test_unredacted_guards_are_fatal() {
        let keywords = Keywords::new();
        let shape = Shape::field(rdfs::LABEL, Shape::role(["admin"]));

        let result = Validator::new(FOCUS, &keywords).validate(&shape, &json!({ "label": "x" }));

        assert!(matches!(result, Err(CodecError::Shape(ShapeError::UnredactedGuard(_)))));
    }
}
