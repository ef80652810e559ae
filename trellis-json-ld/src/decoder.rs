//! Shape-driven JSON-LD decoder
//!
//! Turns a compacted JSON-LD object into triples, reading property names
//! through the field aliases of the driver shape and typing bare JSON values
//! with the datatypes the shape declares.

use crate::error::{DecodeError, Result};
use crate::iri;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use trellis_graph_ir::{Datatype, Graph, Term, Triple};
use trellis_shape::{aliases, probe, Aliases, Field, Keywords, Shape};
use trellis_vocab::{internal, keywords, rdf, xsd};
use uuid::Uuid;

type JsonMap = Map<String, JsonValue>;

/// Decoder over a single focus resource
///
/// `shape` must be a driver shape (see [`trellis_shape::driver`]).
pub struct Decoder<'a> {
    focus: String,
    keywords: &'a Keywords,
}

impl<'a> Decoder<'a> {
    pub fn new(focus: &str, keywords: &'a Keywords) -> Self {
        Self {
            focus: iri::normalize(focus),
            keywords,
        }
    }

    /// The normalized focus IRI
    pub fn focus(&self) -> &str {
        &self.focus
    }

    /// Decode the description of the focus resource
    pub fn decode(&self, shape: &Shape, json: &JsonValue) -> Result<Graph> {
        let (object, aliases) = self.root(shape, json)?;

        self.fields(&Term::iri(&self.focus), &aliases, object, "")
    }

    /// The root object of a description, with its keywords checked
    ///
    /// A declared `@id` must resolve to the focus.
    pub(crate) fn root<'j>(&self, shape: &Shape, json: &'j JsonValue) -> Result<(&'j JsonMap, Aliases)> {
        let JsonValue::Object(object) = json else {
            return Err(unexpected("", json));
        };

        let aliases = aliases(shape, self.keywords)?;
        let declared = self.keywords(&aliases, object)?;

        if let Some(id) = declared.get(keywords::ID) {
            let id = keyword_string(keywords::ID, id)?;
            let resolved = iri::resolve(&self.focus, id);

            if resolved != self.focus {
                return Err(DecodeError::ConflictingId {
                    expected: self.focus.clone(),
                    found: resolved,
                });
            }
        }

        Ok((object, aliases))
    }

    /// Decode the values of a JSON property against a field shape
    ///
    /// Each value comes with the triples describing it.
    pub fn values(&self, shape: &Shape, json: &JsonValue, path: &str) -> Result<Vec<(Term, Graph)>> {
        match json {
            JsonValue::Array(items) => {
                let mut values = Vec::with_capacity(items.len());

                for (index, item) in items.iter().enumerate() {
                    let path = format!("{}/{}", path, index);

                    if item.is_array() {
                        return Err(DecodeError::NestedArray(path));
                    }

                    values.extend(self.value(shape, item, &path)?);
                }

                Ok(values)
            }
            _ => self.value(shape, json, path),
        }
    }

    /// The resource a JSON object describes, without decoding its fields
    ///
    /// `None` for value objects and tagged-literal maps, which describe
    /// literals instead.
    pub(crate) fn subject(&self, shape: &Shape, object: &JsonMap) -> Result<Option<Term>> {
        let aliases = aliases(shape, self.keywords)?;
        let declared = self.keywords(&aliases, object)?;

        if declared.contains_key(keywords::VALUE) || declared.is_empty() && probe::tagged(shape) {
            return Ok(None);
        }

        Ok(Some(match declared.get(keywords::ID) {
            Some(id) => self.resource(keyword_string(keywords::ID, id)?),
            None => fresh_blank(),
        }))
    }

    fn value(&self, shape: &Shape, json: &JsonValue, path: &str) -> Result<Vec<(Term, Graph)>> {
        let term = match json {
            JsonValue::Null => return Ok(Vec::new()),
            JsonValue::Bool(value) => Term::boolean(*value),
            JsonValue::Number(number) => number_literal(shape, number),
            JsonValue::String(value) => self.string(shape, value)?,
            JsonValue::Object(object) => return self.object(shape, object, path),
            JsonValue::Array(_) => return Err(DecodeError::NestedArray(path.to_string())),
        };

        Ok(vec![(term, Graph::new())])
    }

    fn string(&self, shape: &Shape, value: &str) -> Result<Term> {
        let datatype = probe::datatype(shape);

        Ok(match datatype {
            Some(internal::IRI) => Term::iri(iri::resolve(&self.focus, value)),
            Some(internal::BNODE) => blank(value),
            Some(internal::RESOURCE) => self.resource(value),
            Some(rdf::LANG_STRING) | None if probe::tagged(shape) => match probe::lang(shape) {
                Some(lang) => Term::lang_string(value, lang),
                None => return Err(DecodeError::UnknownLanguage(value.to_string())),
            },
            Some(datatype) if is_concrete(datatype) => {
                Term::typed(value, Datatype::from_iri(datatype))
            }
            _ => Term::string(value),
        })
    }

    fn object(&self, shape: &Shape, object: &JsonMap, path: &str) -> Result<Vec<(Term, Graph)>> {
        let aliases = aliases(shape, self.keywords)?;
        let declared = self.keywords(&aliases, object)?;

        if let Some(value) = declared.get(keywords::VALUE) {
            return self.literal(shape, object, &declared, value, path);
        }

        let Some(subject) = self.subject(shape, object)? else {
            return tagged(object, path);
        };

        let graph = self.fields(&subject, &aliases, object, path)?;

        Ok(vec![(subject, graph)])
    }

    fn literal(
        &self,
        shape: &Shape,
        object: &JsonMap,
        declared: &BTreeMap<&'static str, &JsonValue>,
        value: &JsonValue,
        path: &str,
    ) -> Result<Vec<(Term, Graph)>> {
        if let Some((name, _)) = object
            .iter()
            .find(|(name, _)| self.keywords.keyword(name).is_none())
        {
            return Err(DecodeError::UnknownField(format!("{}/{}", path, name)));
        }

        let lexical = match value {
            JsonValue::String(lexical) => lexical.clone(),
            JsonValue::Bool(_) | JsonValue::Number(_) => value.to_string(),
            _ => return Err(unexpected(path, value)),
        };

        let term = if let Some(datatype) = declared.get(keywords::TYPE) {
            let datatype = keyword_string(keywords::TYPE, datatype)?;
            Term::typed(lexical, Datatype::from_iri(iri::resolve(&self.focus, datatype)))
        } else if let Some(language) = declared.get(keywords::LANGUAGE) {
            Term::lang_string(lexical, keyword_string(keywords::LANGUAGE, language)?)
        } else if value.is_string() {
            match probe::datatype(shape) {
                Some(datatype) if is_concrete(datatype) && datatype != rdf::LANG_STRING => {
                    Term::typed(lexical, Datatype::from_iri(datatype))
                }
                _ => Term::string(lexical),
            }
        } else {
            return self.value(shape, value, path);
        };

        Ok(vec![(term, Graph::new())])
    }

    fn fields(&self, subject: &Term, aliases: &Aliases, object: &JsonMap, path: &str) -> Result<Graph> {
        let mut graph = Graph::new();

        for (name, value) in object {
            if let Some(field) = aliases.get(name) {
                tracing::trace!(field = %field, "decoding field");
                graph.merge(self.field(subject, field, value, &format!("{}/{}", path, name))?);
            } else if let Some(keyword) = self.keywords.keyword(name) {
                if keyword == keywords::TYPE {
                    graph.merge(self.types(subject, value)?);
                }
            } else {
                return Err(DecodeError::UnknownField(format!("{}/{}", path, name)));
            }
        }

        Ok(graph)
    }

    fn field(&self, subject: &Term, field: &Field, json: &JsonValue, path: &str) -> Result<Graph> {
        let mut graph = Graph::new();
        let predicate = Term::iri(field.iri.as_ref());

        for (value, nested) in self.values(&field.shape, json, path)? {
            if field.inverse {
                if !value.is_resource() {
                    return Err(DecodeError::InverseLiteral {
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
                graph.add(Triple::new(value, predicate.clone(), subject.clone()));
            } else {
                graph.add(Triple::new(subject.clone(), predicate.clone(), value));
            }

            graph.merge(nested);
        }

        Ok(graph)
    }

    /// Plain `@type` values on resources without a typed field
    fn types(&self, subject: &Term, json: &JsonValue) -> Result<Graph> {
        let values: Vec<&JsonValue> = match json {
            JsonValue::Array(values) => values.iter().collect(),
            value => vec![value],
        };

        let mut graph = Graph::new();

        for value in values {
            let iri = keyword_string(keywords::TYPE, value)?;
            graph.add_triple(
                subject.clone(),
                Term::iri(rdf::TYPE),
                Term::iri(iri::resolve(&self.focus, iri)),
            );
        }

        Ok(graph)
    }

    /// Keyword properties of an object, by keyword
    ///
    /// Properties aliased to fields are excluded; identical duplicates (after
    /// IRI resolution for `@id` and `@type`) merge, others conflict.
    fn keywords<'j>(
        &self,
        aliases: &Aliases,
        object: &'j JsonMap,
    ) -> Result<BTreeMap<&'static str, &'j JsonValue>> {
        let mut declared: BTreeMap<&'static str, &'j JsonValue> = BTreeMap::new();

        for (name, value) in object {
            if aliases.contains(name) {
                continue;
            }

            let Some(keyword) = self.keywords.keyword(name) else {
                continue;
            };

            let keyword = match keyword {
                keywords::ID => keywords::ID,
                keywords::TYPE => keywords::TYPE,
                keywords::VALUE => keywords::VALUE,
                keywords::LANGUAGE => keywords::LANGUAGE,
                _ => continue,
            };

            match declared.get(keyword) {
                Some(existing) if !self.same_keyword_value(keyword, existing, value) => {
                    return Err(DecodeError::ConflictingKeyword {
                        keyword: keyword.to_string(),
                        first: existing.to_string(),
                        second: value.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    declared.insert(keyword, value);
                }
            }
        }

        Ok(declared)
    }

    fn same_keyword_value(&self, keyword: &str, x: &JsonValue, y: &JsonValue) -> bool {
        match (keyword, x, y) {
            (keywords::ID | keywords::TYPE, JsonValue::String(x), JsonValue::String(y)) => {
                x == y || iri::resolve(&self.focus, x) == iri::resolve(&self.focus, y)
            }
            _ => x == y,
        }
    }

    fn resource(&self, id: &str) -> Term {
        if id.is_empty() || id.starts_with("_:") {
            blank(id)
        } else {
            Term::iri(iri::resolve(&self.focus, id))
        }
    }
}

/// Blank node for an id, fresh for the empty id
fn blank(id: &str) -> Term {
    let label = id.strip_prefix("_:").unwrap_or(id);

    if label.is_empty() {
        fresh_blank()
    } else {
        Term::blank(label)
    }
}

/// `{lang: value | [values]}` shorthand for tagged literals
fn tagged(object: &JsonMap, path: &str) -> Result<Vec<(Term, Graph)>> {
    let mut values = Vec::new();

    for (lang, value) in object {
        let path = format!("{}/{}", path, lang);

        match value {
            JsonValue::String(text) => values.push((Term::lang_string(text, lang), Graph::new())),
            JsonValue::Array(texts) => {
                for text in texts {
                    let JsonValue::String(text) = text else {
                        return Err(unexpected(&path, text));
                    };
                    values.push((Term::lang_string(text, lang), Graph::new()));
                }
            }
            JsonValue::Null => {}
            other => return Err(unexpected(&path, other)),
        }
    }

    Ok(values)
}

fn number_literal(shape: &Shape, number: &serde_json::Number) -> Term {
    let lexical = number.to_string();
    let integral = number.is_i64() || number.is_u64();

    match probe::datatype(shape) {
        Some(datatype)
            if xsd::is_integer_type(datatype)
                || datatype == xsd::DECIMAL
                || datatype == xsd::DOUBLE
                || datatype == xsd::FLOAT =>
        {
            Term::typed(lexical, Datatype::from_iri(datatype))
        }
        _ if integral => Term::typed(lexical, Datatype::xsd_integer()),
        _ => Term::typed(lexical, Datatype::xsd_decimal()),
    }
}

fn is_concrete(datatype: &str) -> bool {
    !datatype.starts_with(internal::NAMESPACE)
}

fn keyword_string<'j>(keyword: &str, value: &'j JsonValue) -> Result<&'j str> {
    value.as_str().ok_or_else(|| DecodeError::MalformedKeyword {
        keyword: keyword.to_string(),
    })
}

fn fresh_blank() -> Term {
    Term::blank(Uuid::new_v4().simple().to_string())
}

fn unexpected(path: &str, value: &JsonValue) -> DecodeError {
    DecodeError::UnexpectedValue {
        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use trellis_shape::drive;
    use trellis_vocab::rdfs;

    const FOCUS: &str = "https://example.com/people/alice";
    const KNOWS: &str = "https://example.com/terms#knows";
    const AGE: &str = "https://example.com/terms#age";

    fn decode(shape: &Shape, json: JsonValue) -> Result<Graph> {
        let keywords = Keywords::new();
        Decoder::new(FOCUS, &keywords).decode(&drive(shape), &json)
    }

    fn triple(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, Term::iri(p), o)
    }

    #[test]
    fn test_bare_values_follow_shape_datatype() {
        let shape = Shape::and([
            Shape::field(AGE, Shape::datatype(xsd::DECIMAL)),
            Shape::field(rdfs::LABEL, Shape::and([])),
            Shape::field(KNOWS, Shape::datatype(internal::IRI)),
        ]);

        let graph = decode(
            &shape,
            json!({ "age": 42, "label": "Alice", "knows": "bob" }),
        )
        .unwrap();

        let alice = Term::iri(FOCUS);

        assert_eq!(
            graph,
            Graph::from_iter([
                triple(alice.clone(), AGE, Term::decimal("42")),
                triple(alice.clone(), rdfs::LABEL, Term::string("Alice")),
                triple(alice, KNOWS, Term::iri("https://example.com/people/bob")),
            ])
        );
    }

    #[test]
    fn test_untyped_numbers() {
        let shape = Shape::field(AGE, Shape::and([]));

        let graph = decode(&shape, json!({ "age": [1, 1.5] })).unwrap();

        assert!(graph.contains(&triple(Term::iri(FOCUS), AGE, Term::integer(1))));
        assert!(graph.contains(&triple(Term::iri(FOCUS), AGE, Term::decimal("1.5"))));
    }

    #[test]
    fn test_value_objects() {
        let shape = Shape::field(rdfs::LABEL, Shape::and([]));

        let graph = decode(
            &shape,
            json!({
                "label": [
                    { "@value": "Alice", "@language": "en" },
                    { "@value": "2020-01-01", "@type": xsd::DATE }
                ]
            }),
        )
        .unwrap();

        assert!(graph.contains(&triple(Term::iri(FOCUS), rdfs::LABEL, Term::lang_string("Alice", "en"))));
        assert!(graph.contains(&triple(
            Term::iri(FOCUS),
            rdfs::LABEL,
            Term::typed("2020-01-01", Datatype::from_iri(xsd::DATE))
        )));
    }

    #[test]
    fn test_nested_objects_and_blank_nodes() {
        let shape = Shape::field(KNOWS, Shape::field(rdfs::LABEL, Shape::and([])));

        let graph = decode(
            &shape,
            json!({
                "knows": [
                    { "@id": "_:x", "label": "X" },
                    { "label": "Anonymous" }
                ]
            }),
        )
        .unwrap();

        assert_eq!(graph.len(), 4);
        assert!(graph.contains(&triple(Term::iri(FOCUS), KNOWS, Term::blank("x"))));
        assert!(graph.contains(&triple(Term::blank("x"), rdfs::LABEL, Term::string("X"))));
    }

    #[test]
    fn test_inverse_fields() {
        let shape = Shape::inverse_field(KNOWS, Shape::and([]));

        let graph = decode(&shape, json!({ "knowsOf": "/people/bob" })).unwrap();

        assert_eq!(
            graph,
            Graph::from_iter([triple(
                Term::iri("https://example.com/people/bob"),
                KNOWS,
                Term::iri(FOCUS)
            )])
        );

        let literal = decode(&shape, json!({ "knowsOf": { "@value": "bob" } }));
        assert!(matches!(literal, Err(DecodeError::InverseLiteral { .. })));
    }

    #[test]
    fn test_tagged_shorthands() {
        let english = Shape::field(rdfs::LABEL, Shape::lang(["en"]));

        let graph = decode(&english, json!({ "label": ["one", "two"] })).unwrap();
        assert!(graph.contains(&triple(Term::iri(FOCUS), rdfs::LABEL, Term::lang_string("one", "en"))));
        assert_eq!(graph.len(), 2);

        let localized = Shape::field(rdfs::LABEL, Shape::localized());

        let graph = decode(&localized, json!({ "label": { "en": "one", "it": ["uno"] } })).unwrap();
        assert!(graph.contains(&triple(Term::iri(FOCUS), rdfs::LABEL, Term::lang_string("uno", "it"))));
        assert_eq!(graph.len(), 2);

        assert!(matches!(
            decode(&localized, json!({ "label": "one" })),
            Err(DecodeError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_plain_types() {
        let graph = decode(
            &Shape::and([]),
            json!({ "@type": ["https://example.com/terms#Person"] }),
        )
        .unwrap();

        assert_eq!(
            graph,
            Graph::from_iter([triple(
                Term::iri(FOCUS),
                rdf::TYPE,
                Term::iri("https://example.com/terms#Person")
            )])
        );
    }

    #[test]
    fn test_structural_errors() {
        let shape = Shape::field(rdfs::LABEL, Shape::and([]));

        assert!(matches!(
            decode(&shape, json!({ "@id": "/people/bob" })),
            Err(DecodeError::ConflictingId { .. })
        ));
        assert!(matches!(
            decode(&shape, json!({ "name": "x" })),
            Err(DecodeError::UnknownField(_))
        ));
        assert!(matches!(
            decode(&shape, json!({ "label": [["x"]] })),
            Err(DecodeError::NestedArray(_))
        ));
        assert!(matches!(
            decode(&shape, json!({ "@id": 1 })),
            Err(DecodeError::MalformedKeyword { .. })
        ));
        assert!(matches!(
            decode(&shape, json!(["x"])),
            Err(DecodeError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_root_id_matches_focus() {
        let shape = Shape::field(rdfs::LABEL, Shape::and([]));

        assert!(decode(&shape, json!({ "@id": FOCUS })).is_ok());
        assert!(decode(&shape, json!({ "@id": "/people/alice" })).is_ok());
        assert!(decode(&shape, json!({ "@id": "alice" })).is_ok());
    }

    #[test]
    fn test_keyword_duplicates() {
        let keywords = Keywords::new().with("@id", "id");
        let shape = drive(&Shape::field(rdfs::LABEL, Shape::and([])));
        let decoder = Decoder::new(FOCUS, &keywords);

        let merged = decoder.decode(
            &shape,
            &json!({ "@id": "/people/alice", "id": FOCUS, "label": "Alice" }),
        );
        assert_eq!(merged.unwrap().len(), 1);

        let conflicting = decoder.decode(&shape, &json!({ "@id": FOCUS, "id": "/people/bob" }));
        assert!(matches!(conflicting, Err(DecodeError::ConflictingKeyword { .. })));
    }
}
