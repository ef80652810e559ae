//! Shape-driven JSON-LD encoder
//!
//! Compacts the description of a focus resource into a JSON-LD tree shaped
//! by the driver shape. Cycles are cut by a trail of the resources being
//! expanded on the current path: a resource met again on its own trail is
//! written as a reference, never re-expanded.

use crate::error::CodecError;
use crate::iri;
use serde_json::{json, Map, Number, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};
use trellis_graph_ir::{value, Graph, Term};
use trellis_shape::{aliases, probe, Field, Keywords, Shape};
use trellis_vocab::{internal, keywords, rdf, xsd};

type JsonMap = Map<String, JsonValue>;

/// Resources being expanded on the current path, innermost first
struct Trail<'t> {
    resource: &'t Term,
    parent: Option<&'t Trail<'t>>,
}

impl<'t> Trail<'t> {
    fn contains(trail: Option<&Trail<'_>>, resource: &Term) -> bool {
        let mut next = trail;
        while let Some(step) = next {
            if step.resource == resource {
                return true;
            }
            next = step.parent;
        }
        false
    }
}

/// A JSON node and the trail resources it refers back to
type Encoded = (JsonValue, BTreeSet<Term>);

/// Encoder for the descriptions held by a graph
///
/// `shape` must be a driver shape (see [`trellis_shape::driver`]).
pub struct Encoder<'a> {
    graph: &'a Graph,
    keywords: &'a Keywords,
    root: Option<String>,
}

impl<'a> Encoder<'a> {
    /// Create an encoder relativizing IRIs against the root of `focus`
    pub fn new(focus: &str, graph: &'a Graph, keywords: &'a Keywords) -> Self {
        Self {
            graph,
            keywords,
            root: iri::root(focus),
        }
    }

    /// Override the relativization root
    pub fn with_root(mut self, root: Option<String>) -> Self {
        self.root = root;
        self
    }

    /// Encode the focus resource
    ///
    /// `focus` is normalized the way the decoder normalizes it.
    pub fn encode(&self, focus: &str, shape: &Shape, embed_context: bool) -> Result<JsonValue, CodecError> {
        let focus = Term::iri(iri::normalize(focus));
        let (json, _) = self.expand(&focus, shape, None)?;

        let JsonValue::Object(object) = json else {
            return Ok(json);
        };

        if !embed_context {
            return Ok(JsonValue::Object(object));
        }

        let mut framed = JsonMap::new();
        framed.insert(self.keyword(keywords::CONTEXT), self.context(shape)?);
        framed.extend(object);

        Ok(JsonValue::Object(framed))
    }

    fn keyword(&self, keyword: &str) -> String {
        self.keywords.alias(keyword).to_string()
    }

    fn value(&self, value: &Term, shape: &Shape, trail: Option<&Trail<'_>>) -> Result<Encoded, CodecError> {
        if value.is_literal() {
            return Ok((self.literal(value, shape), BTreeSet::new()));
        }

        if Trail::contains(trail, value) {
            let json = if inlineable(shape) {
                JsonValue::String(self.id(value))
            } else {
                json!({ self.keyword(keywords::ID): self.id(value) })
            };
            return Ok((json, BTreeSet::from([value.clone()])));
        }

        if inlineable(shape) && probe::fields(shape).is_empty() {
            return Ok((JsonValue::String(self.id(value)), BTreeSet::new()));
        }

        self.expand(value, shape, trail)
    }

    fn expand(&self, resource: &Term, shape: &Shape, trail: Option<&Trail<'_>>) -> Result<Encoded, CodecError> {
        let trail = Trail {
            resource,
            parent: trail,
        };

        let mut fields = JsonMap::new();
        let mut references = BTreeSet::new();

        for (alias, field) in aliases(shape, self.keywords)?.iter() {
            let values: Vec<&Term> = self
                .graph
                .edges(resource, &field.iri, field.inverse)
                .map(|triple| triple.target(field.inverse))
                .collect();

            if values.is_empty() {
                continue;
            }

            tracing::trace!(field = %field, values = values.len(), "encoding field");

            let encoded = if probe::tagged(&field.shape) && values.iter().all(|v| v.language().is_some()) {
                tagged(field, &values)
            } else {
                let mut encoded = Vec::with_capacity(values.len());
                for value in &values {
                    let (json, refs) = self.value(value, &field.shape, Some(&trail))?;
                    references.extend(refs);
                    encoded.push(json);
                }
                compact(field, encoded)
            };

            fields.insert(alias.to_string(), encoded);
        }

        let referenced = references.remove(resource);

        let mut object = JsonMap::new();
        if resource.is_iri() || referenced {
            object.insert(self.keyword(keywords::ID), JsonValue::String(self.id(resource)));
        }
        object.extend(fields);

        Ok((JsonValue::Object(object), references))
    }

    fn id(&self, resource: &Term) -> String {
        match resource {
            Term::Iri(id) => match &self.root {
                Some(root) => iri::relativize(root, id),
                None => id.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// The most specific JSON form of a literal
    fn literal(&self, literal: &Term, shape: &Shape) -> JsonValue {
        let Some((lexical, datatype, language)) = literal.as_literal() else {
            return JsonValue::Null;
        };

        let typed = || {
            json!({
                self.keyword(keywords::VALUE): lexical,
                self.keyword(keywords::TYPE): datatype.as_iri(),
            })
        };

        if let Some(language) = language {
            return json!({
                self.keyword(keywords::VALUE): lexical,
                self.keyword(keywords::LANGUAGE): language,
            });
        }

        let declared = probe::datatype(shape);
        let kind = datatype.as_iri();

        // bare numbers decode with the declared numeric datatype, if any
        let numeric = declared.filter(|&d| is_numeric(d));
        let as_number = match kind {
            xsd::INTEGER => numeric.is_none() || numeric == Some(kind),
            xsd::DECIMAL => numeric == Some(kind) || (numeric.is_none() && lexical.contains('.')),
            _ => false,
        };

        let compacted = match kind {
            xsd::STRING => Some(JsonValue::String(lexical.to_string())),
            xsd::BOOLEAN => value::boolean(lexical).map(JsonValue::Bool),
            xsd::INTEGER | xsd::DECIMAL if as_number => match number(lexical) {
                Some(number) => Some(JsonValue::Number(number)),
                None if value::is_well_formed(literal) => return typed(),
                None => None,
            },
            _ if declared == Some(kind) && value::is_well_formed(literal) => {
                return JsonValue::String(lexical.to_string());
            }
            _ => return typed(),
        };

        compacted.unwrap_or_else(|| {
            tracing::warn!(%literal, "malformed literal, falling back to typed form");
            typed()
        })
    }

    /// The `@context` mapping keyword aliases and the fields of the shape
    fn context(&self, shape: &Shape) -> Result<JsonValue, CodecError> {
        let mut context = JsonMap::new();

        for (keyword, alias) in self.keywords.iter() {
            context.insert(alias.to_string(), JsonValue::String(keyword.to_string()));
        }

        for (alias, field) in aliases(shape, self.keywords)?.iter() {
            if self.keywords.keyword(alias).is_some() {
                continue;
            }

            context.insert(alias.to_string(), term_definition(field));
        }

        Ok(JsonValue::Object(context))
    }
}

fn is_numeric(datatype: &str) -> bool {
    xsd::is_integer_type(datatype)
        || datatype == xsd::DECIMAL
        || datatype == xsd::DOUBLE
        || datatype == xsd::FLOAT
}

/// The JSON number spelled exactly as `lexical`
///
/// Numbers that JSON can only approximate (beyond 64-bit integers, beyond
/// `f64` precision, or with non-canonical digits) have none.
fn number(lexical: &str) -> Option<Number> {
    lexical
        .parse::<i64>()
        .map(Number::from)
        .or_else(|_| lexical.parse::<u64>().map(Number::from))
        .ok()
        .or_else(|| lexical.parse::<f64>().ok().and_then(Number::from_f64))
        .filter(|number| number.to_string() == lexical)
}

fn term_definition(field: &Field) -> JsonValue {
    let mut definition = JsonMap::new();

    if field.inverse {
        definition.insert(keywords::REVERSE.into(), JsonValue::String(field.iri.to_string()));
    } else {
        definition.insert(keywords::ID.into(), JsonValue::String(field.iri.to_string()));
    }

    let shape = &field.shape;
    let datatype = probe::datatype(shape);

    if inlineable(shape) {
        definition.insert(keywords::TYPE.into(), JsonValue::String(keywords::ID.into()));
    } else if probe::localized(shape) {
        definition.insert(keywords::CONTAINER.into(), JsonValue::String(keywords::LANGUAGE.into()));
    } else if let Some(lang) = probe::lang(shape) {
        definition.insert(keywords::LANGUAGE.into(), JsonValue::String(lang.into()));
    } else if let Some(datatype) = datatype
        .filter(|datatype| *datatype != rdf::LANG_STRING && !datatype.starts_with(internal::NAMESPACE))
    {
        definition.insert(keywords::TYPE.into(), JsonValue::String(datatype.into()));
    }

    if definition.len() == 1 && !field.inverse {
        JsonValue::String(field.iri.to_string())
    } else {
        JsonValue::Object(definition)
    }
}

/// Scalar for single-valued fields, array otherwise
fn compact(field: &Field, mut values: Vec<JsonValue>) -> JsonValue {
    if values.len() == 1 && probe::max_count(&field.shape).is_some_and(|max| max <= 1) {
        values.remove(0)
    } else {
        JsonValue::Array(values)
    }
}

/// Language-tagged values, compacted by language
fn tagged(field: &Field, values: &[&Term]) -> JsonValue {
    let shape = &field.shape;

    if let Some(lang) = probe::lang(shape) {
        if values.iter().all(|v| v.language() == Some(lang)) {
            let texts: Vec<JsonValue> = values.iter().map(|v| JsonValue::String(v.text().into())).collect();
            return compact(field, texts);
        }
    }

    let mut by_lang: BTreeMap<&str, Vec<JsonValue>> = BTreeMap::new();
    for value in values {
        if let Some(lang) = value.language() {
            by_lang
                .entry(lang)
                .or_default()
                .push(JsonValue::String(value.text().into()));
        }
    }

    let localized = probe::localized(shape);

    JsonValue::Object(
        by_lang
            .into_iter()
            .map(|(lang, mut texts)| {
                let json = if localized && texts.len() == 1 {
                    texts.remove(0)
                } else {
                    JsonValue::Array(texts)
                };
                (lang.to_string(), json)
            })
            .collect(),
    )
}

/// Check if resource values of the shape can be written as bare ids
fn inlineable(shape: &Shape) -> bool {
    matches!(
        probe::datatype(shape),
        Some(internal::IRI | internal::BNODE | internal::RESOURCE)
    )
}
