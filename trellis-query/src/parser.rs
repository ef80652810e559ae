//! Query parser
//!
//! Turns the query part of a request URL into a [`Query`] over a shape.
//! Queries come either as a JSON filter object (plain or percent-encoded)
//! or as form-encoded `key=value` pairs, translated into the equivalent
//! JSON object first.
//!
//! Filter keys are an optional operator prefix followed by a dotted path of
//! field aliases; reserved keys start with a dot:
//!
//! | key | meaning |
//! |---|---|
//! | `^path` | datatype |
//! | `@path` | class |
//! | `%path` | value range |
//! | `>=path`, `<=path`, `>path`, `<path` | value bounds |
//! | `$>path`, `$<path` | length bounds |
//! | `*path`, `~path`, `'path` | pattern, keywords, stem |
//! | `#>path`, `#<path` | count bounds |
//! | `!path` | all values |
//! | `?path`, `path` | any value |
//! | `.terms`, `.stats` | path of a terms or stats query |
//! | `.order` | `[+-]path` sort criteria |
//! | `.offset`, `.limit` | paging |

use crate::error::{ParseError, Result};
use crate::query::{Order, Query, Step};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use trellis_graph_ir::Term;
use trellis_json_ld::{iri, Decoder};
use trellis_shape::{aliases, driver, probe, Field, Keywords, Link, Shape};

type JsonMap = Map<String, JsonValue>;

static STEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.?(\w+)\b").unwrap());

const TERMS: &str = ".terms";
const STATS: &str = ".stats";
const ORDER: &str = ".order";
const OFFSET: &str = ".offset";
const LIMIT: &str = ".limit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Datatype,
    Clazz,
    Range,
    MinInclusive,
    MaxInclusive,
    MinExclusive,
    MaxExclusive,
    MinLength,
    MaxLength,
    Pattern,
    Like,
    Stem,
    MinCount,
    MaxCount,
    All,
    Any,
}

/// Key prefixes, longest matches first
const OPERATORS: [(&str, Operator); 16] = [
    ("^", Operator::Datatype),
    ("@", Operator::Clazz),
    ("%", Operator::Range),
    (">=", Operator::MinInclusive),
    ("<=", Operator::MaxInclusive),
    (">", Operator::MinExclusive),
    ("<", Operator::MaxExclusive),
    ("$>", Operator::MinLength),
    ("$<", Operator::MaxLength),
    ("*", Operator::Pattern),
    ("~", Operator::Like),
    ("'", Operator::Stem),
    ("#>", Operator::MinCount),
    ("#<", Operator::MaxCount),
    ("!", Operator::All),
    ("?", Operator::Any),
];

fn operator(key: &str) -> (Operator, &str) {
    OPERATORS
        .iter()
        .find_map(|(prefix, operator)| key.strip_prefix(prefix).map(|path| (*operator, path)))
        .unwrap_or((Operator::Any, key))
}

/// A resolved path step and the link it was reached through, if any
type Resolved = (Field, Option<Arc<str>>);

/// Parser for queries over a base shape
pub struct QueryParser<'a> {
    base: &'a Shape,
    shape: Arc<Shape>,
    keywords: &'a Keywords,
    decoder: Decoder<'a>,
}

impl<'a> QueryParser<'a> {
    /// Create a parser; filter values resolve relative IRIs against `focus`
    pub fn new(focus: &str, base: &'a Shape, keywords: &'a Keywords) -> Self {
        Self {
            base,
            shape: driver(base),
            keywords,
            decoder: Decoder::new(focus, keywords),
        }
    }

    pub fn parse(&self, query: &str) -> Result<Query> {
        if query.is_empty() {
            Ok(Query::items(self.base.clone()))
        } else if query.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("%7B")) {
            let decoded = percent_decode_str(query)
                .decode_utf8()
                .map_err(|e| ParseError::Syntax(e.to_string()))?;
            self.json(&serde_json::from_str(&decoded)?)
        } else if query.starts_with('{') {
            self.json(&serde_json::from_str(query)?)
        } else {
            self.json(&form(query))
        }
    }

    fn json(&self, query: &JsonValue) -> Result<Query> {
        let JsonValue::Object(query) = query else {
            return Err(ParseError::Syntax("filter is not an object".to_string()));
        };

        let filter = self.filter(query)?;

        let terms = self.path_of(query, TERMS)?;
        let stats = self.path_of(query, STATS)?;
        let orders = self.orders(query)?;

        let offset = natural(query.get(OFFSET)).map_err(ParseError::InvalidOffset)?;
        let limit = natural(query.get(LIMIT)).map_err(ParseError::InvalidLimit)?;

        // filtering only: result shaping stays with the base shape
        let shape = self.base.clone().filtered(filter);

        tracing::debug!(%shape, offset, limit, "parsed query");

        Ok(match (terms, stats) {
            (Some(path), _) => Query::Terms {
                shape,
                path,
                offset,
                limit,
            },
            (None, Some(path)) => Query::Stats {
                shape,
                path,
                offset,
                limit,
            },
            (None, None) => Query::Items {
                shape,
                orders,
                offset,
                limit,
            },
        })
    }

    // =========================================================================
    // Filters
    // =========================================================================

    fn filter(&self, query: &JsonMap) -> Result<Shape> {
        let mut filters = Vec::new();

        for (key, value) in query {
            if key.starts_with('.') || value.is_null() {
                continue;
            }

            let (operator, path) = operator(key);
            let steps = self.steps(path)?;

            let target = steps.last().map_or(self.shape.as_ref(), |(field, _)| field.shape.as_ref());
            let constraint = self.constraint(operator, value, target, key)?;

            if constraint.is_empty_and() {
                continue;
            }

            filters.push(steps.iter().rev().fold(constraint, |nested, (field, link)| {
                let field = field.with_shape(nested);
                match link {
                    Some(iri) => Shape::link(iri.as_ref(), field),
                    None => field,
                }
            }));
        }

        Ok(Shape::and(filters))
    }

    fn constraint(&self, operator: Operator, value: &JsonValue, shape: &Shape, key: &str) -> Result<Shape> {
        let text = |what: &str| {
            value
                .as_str()
                .ok_or_else(|| ParseError::Syntax(format!("{} value is not a string", what)))
        };

        let number = |what: &str| {
            natural(Some(value)).map_err(|_| ParseError::Syntax(format!("{} value is not a number", what)))
        };

        Ok(match operator {
            Operator::Datatype => Shape::datatype(iri::resolve(self.decoder.focus(), text("datatype")?)),
            Operator::Clazz => Shape::clazz(iri::resolve(self.decoder.focus(), text("class")?)),

            Operator::Range => Shape::range(self.values(value, shape, key)?),
            Operator::All => Shape::all(self.values(value, shape, key)?),
            Operator::Any => Shape::any(self.values(value, shape, key)?),

            Operator::MinInclusive => Shape::min_inclusive(self.value(value, shape, key)?),
            Operator::MaxInclusive => Shape::max_inclusive(self.value(value, shape, key)?),
            Operator::MinExclusive => Shape::min_exclusive(self.value(value, shape, key)?),
            Operator::MaxExclusive => Shape::max_exclusive(self.value(value, shape, key)?),

            Operator::MinLength => Shape::min_length(number("length")?),
            Operator::MaxLength => Shape::max_length(number("length")?),
            Operator::MinCount => Shape::min_count(number("count")?),
            Operator::MaxCount => Shape::max_count(number("count")?),

            Operator::Pattern => match text("pattern")? {
                "" => Shape::and([]),
                pattern => Shape::pattern(pattern),
            },
            Operator::Like => match text("keywords")? {
                "" => Shape::and([]),
                keywords => Shape::like(keywords),
            },
            Operator::Stem => match text("stem")? {
                "" => Shape::and([]),
                stem => Shape::stem(stem),
            },
        })
    }

    fn values(&self, value: &JsonValue, shape: &Shape, key: &str) -> Result<Vec<Term>> {
        Ok(self
            .decoder
            .values(shape, value, &format!("/{}", key))?
            .into_iter()
            .map(|(term, _)| term)
            .collect())
    }

    fn value(&self, value: &JsonValue, shape: &Shape, key: &str) -> Result<Term> {
        let mut values = self.values(value, shape, key)?;

        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Err(ParseError::Syntax(format!("<{}> is not a single value", key)))
        }
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Resolve a dotted path of aliases against the driver shape
    fn steps(&self, path: &str) -> Result<Vec<Resolved>> {
        let trimmed = path.trim();

        let mut steps: Vec<Resolved> = Vec::new();
        let mut rest = trimmed;

        while !rest.is_empty() {
            let (end, step) = STEP
                .captures(rest)
                .and_then(|captures| Some((captures.get(0)?.end(), captures.get(1)?.as_str())))
                .ok_or_else(|| ParseError::Syntax(format!("malformed path <{}>", trimmed)))?;

            let reference = steps.last().map_or(self.shape.as_ref(), |(field, _)| field.shape.as_ref());

            let field = aliases(reference, self.keywords)?
                .get(step)
                .cloned()
                .ok_or_else(|| ParseError::NotFound(step.to_string()))?;

            let link = link(reference)
                .filter(|link| probe::fields(&link.shape).iter().any(|f| f.same_edge(&field)))
                .map(|link| link.iri.clone());

            steps.push((field, link));
            rest = &rest[end..];
        }

        Ok(steps)
    }

    fn path_of(&self, query: &JsonMap, key: &str) -> Result<Option<Vec<Step>>> {
        match query.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(path)) => Ok(Some(self.path(path)?)),
            Some(_) => Err(ParseError::Syntax(format!("{} is not a string", key))),
        }
    }

    fn path(&self, path: &str) -> Result<Vec<Step>> {
        Ok(self.steps(path)?.iter().map(|(field, _)| Step::from(field)).collect())
    }

    fn orders(&self, query: &JsonMap) -> Result<Vec<Order>> {
        match query.get(ORDER) {
            None | Some(JsonValue::Null) => Ok(Vec::new()),
            Some(JsonValue::String(criterion)) => Ok(vec![self.criterion(criterion)?]),
            Some(JsonValue::Array(criteria)) => criteria
                .iter()
                .map(|criterion| match criterion {
                    JsonValue::String(criterion) => self.criterion(criterion),
                    _ => Err(ParseError::Syntax(format!("{} criterion is not a string", ORDER))),
                })
                .collect(),
            Some(_) => Err(ParseError::Syntax(format!(
                "{} is neither a string nor an array of strings",
                ORDER
            ))),
        }
    }

    fn criterion(&self, criterion: &str) -> Result<Order> {
        Ok(if let Some(path) = criterion.strip_prefix('+') {
            Order::increasing(self.path(path)?)
        } else if let Some(path) = criterion.strip_prefix('-') {
            Order::decreasing(self.path(path)?)
        } else {
            Order::increasing(self.path(criterion)?)
        })
    }
}

/// The link wrapping the fields at the top level of a shape, if any
fn link(shape: &Shape) -> Option<&Link> {
    match shape {
        Shape::Link(link) => Some(link),
        Shape::And(shapes) | Shape::Or(shapes) => shapes.iter().find_map(link),
        Shape::When(when) => link(&when.pass).or_else(|| link(&when.fail)),
        _ => None,
    }
}

/// A non-negative integer, as a JSON number or string (0 if missing)
fn natural(value: Option<&JsonValue>) -> std::result::Result<usize, String> {
    match value {
        None | Some(JsonValue::Null) => Ok(0),
        Some(JsonValue::Number(number)) => number
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| number.to_string()),
        Some(JsonValue::String(text)) => text.trim().parse().map_err(|_| text.clone()),
        Some(other) => Err(other.to_string()),
    }
}

/// The JSON object equivalent to a form-encoded query
///
/// Values of repeated keys accumulate; comma-separated values split into
/// arrays; numeric paging values become numbers.
fn form(query: &str) -> JsonValue {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => fields.push((key.into_owned(), vec![value.into_owned()])),
        }
    }

    JsonValue::Object(
        fields
            .into_iter()
            .map(|(key, values)| {
                let value = match key.as_str() {
                    TERMS | STATS if values.len() == 1 => JsonValue::String(values[0].clone()),
                    OFFSET | LIMIT if values.len() == 1 => match values[0].parse::<u64>() {
                        Ok(n) => JsonValue::from(n),
                        Err(_) => strings(&values),
                    },
                    _ => strings(&values),
                };
                (key, value)
            })
            .collect(),
    )
}

fn strings(values: &[String]) -> JsonValue {
    let mut split: Vec<JsonValue> = values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|value| JsonValue::String(value.to_string()))
        .collect();

    if split.len() == 1 {
        split.remove(0)
    } else {
        JsonValue::Array(split)
    }
}
