//! The shape model: an immutable, recursive constraint tree
//!
//! Shapes are plain values. Constructors normalize trivially redundant
//! structure (nested connectives, singleton connectives, duplicate
//! branches) so structurally equal schemas compare equal and hash alike,
//! which the driver cache relies on.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use trellis_graph_ir::Term;

/// Metadata label carrying a user-defined field alias
pub const ALIAS: &str = "alias";

/// An operand of a value constraint
///
/// `Focus` stands for an IRI relative to the focus resource of the operation
/// (the empty path is the focus itself) and is resolved when the constraint
/// is evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Term(Term),
    Focus(String),
}

impl Value {
    /// The focus resource itself
    pub fn focus() -> Self {
        Value::Focus(String::new())
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Value::Term(term) => Some(term),
            Value::Focus(_) => None,
        }
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        Value::Term(term)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Term(Term::boolean(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Term(Term::integer(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Term(Term::string(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Term(term) => write!(f, "{}", term),
            Value::Focus(path) => write!(f, "focus({:?})", path),
        }
    }
}

/// Execution-context axes a guard can test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Role,
    Task,
    Area,
    Mode,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Role => "role",
            Axis::Task => "task",
            Axis::Area => "area",
            Axis::Mode => "mode",
        }
    }
}

/// Well-known values of the `mode` axis
pub mod mode {
    /// Shape parts shaping the conveyed representation
    pub const CONVEY: &str = "convey";
    /// Shape parts used only for filtering queries
    pub const FILTER: &str = "filter";
}

/// Well-known values of the `task` axis
pub mod task {
    pub const CREATE: &str = "create";
    pub const RELATE: &str = "relate";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
}

/// Well-known values of the `area` axis
pub mod area {
    pub const TARGET: &str = "target";
    pub const DIGEST: &str = "digest";
    pub const DETAIL: &str = "detail";
}

/// Context-dependent switch, removed by redaction before any codec sees it
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Guard {
    pub axis: Axis,
    pub values: BTreeSet<String>,
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guard({}", self.axis.as_str())?;
        if !self.values.is_empty() {
            let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
            write!(f, " = {}", values.join(", "))?;
        }
        write!(f, ")")
    }
}

/// An edge constraint: values reachable from the focus through `iri`
///
/// Direct fields follow subject to object; inverse fields follow object to
/// subject. `label` is an explicit alias for the edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub iri: Arc<str>,
    pub inverse: bool,
    pub label: Option<String>,
    pub shape: Box<Shape>,
}

impl Field {
    pub fn is_direct(&self) -> bool {
        !self.inverse
    }

    /// Same edge (IRI and direction), regardless of label and nested shape
    pub fn same_edge(&self, other: &Field) -> bool {
        self.iri == other.iri && self.inverse == other.inverse
    }

    /// The same edge constraining its values with another shape
    pub fn with_shape(&self, shape: Shape) -> Shape {
        Shape::edge(self.iri.as_ref(), self.inverse, self.label.clone(), shape)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "^")?;
        }
        write!(f, "{}", self.iri)
    }
}

/// Transparent wrapper: the linked resource stands in for the focus
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub iri: Arc<str>,
    pub shape: Box<Shape>,
}

/// Conditional: `pass` applies where `test` holds, `fail` elsewhere
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct When {
    pub test: Shape,
    pub pass: Shape,
    pub fail: Shape,
}

/// A constraint tree
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    // Logical
    And(Vec<Shape>),
    Or(Vec<Shape>),
    When(Box<When>),

    // Structural
    Field(Field),
    Link(Link),

    // Value constraints
    Datatype(Arc<str>),
    Clazz(Arc<str>),
    Range(BTreeSet<Value>),
    Lang(BTreeSet<String>),
    MinExclusive(Value),
    MaxExclusive(Value),
    MinInclusive(Value),
    MaxInclusive(Value),
    MinLength(usize),
    MaxLength(usize),
    Pattern { expression: String, flags: String },
    Like { keywords: String, stemming: bool },
    Stem(String),

    // Set constraints
    MinCount(usize),
    MaxCount(usize),
    All(BTreeSet<Value>),
    Any(BTreeSet<Value>),
    Localized,

    // Annotations
    Meta { label: String, value: String },
    Guard(Guard),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::and([])
    }
}

// ============================================================================
// Logical constructors
// ============================================================================

impl Shape {
    /// Conjunction; `and([])` is the neutral (always satisfied) shape
    pub fn and(shapes: impl IntoIterator<Item = Shape>) -> Shape {
        let shapes = flatten(shapes, |s| match s {
            Shape::And(nested) => Ok(nested),
            other => Err(other),
        });

        match <[Shape; 1]>::try_from(shapes) {
            Ok([single]) => single,
            Err(shapes) => Shape::And(shapes),
        }
    }

    /// Disjunction; `or([])` is the unsatisfiable shape
    pub fn or(shapes: impl IntoIterator<Item = Shape>) -> Shape {
        let shapes = flatten(shapes, |s| match s {
            Shape::Or(nested) => Ok(nested),
            other => Err(other),
        });

        match <[Shape; 1]>::try_from(shapes) {
            Ok([single]) => single,
            Err(shapes) => Shape::Or(shapes),
        }
    }

    /// Conditional shape
    pub fn when(test: Shape, pass: Shape, fail: Shape) -> Shape {
        if test.is_empty_and() || pass == fail {
            pass
        } else if test.is_empty_or() {
            fail
        } else {
            Shape::When(Box::new(When { test, pass, fail }))
        }
    }

    /// `when(self, and(shapes))`: the shapes apply only where this shape holds
    pub fn then(self, shapes: impl IntoIterator<Item = Shape>) -> Shape {
        Shape::when(self, Shape::and(shapes), Shape::and([]))
    }

    /// Check if this is the neutral `and()` shape
    pub fn is_empty_and(&self) -> bool {
        matches!(self, Shape::And(shapes) if shapes.is_empty())
    }

    /// Check if this is the unsatisfiable `or()` shape
    pub fn is_empty_or(&self) -> bool {
        matches!(self, Shape::Or(shapes) if shapes.is_empty())
    }
}

fn flatten(
    shapes: impl IntoIterator<Item = Shape>,
    nested: impl Fn(Shape) -> std::result::Result<Vec<Shape>, Shape>,
) -> Vec<Shape> {
    let mut flat: Vec<Shape> = Vec::new();

    for shape in shapes {
        match nested(shape) {
            Ok(inner) => {
                for shape in inner {
                    if !flat.contains(&shape) {
                        flat.push(shape);
                    }
                }
            }
            Err(shape) => {
                if !flat.contains(&shape) {
                    flat.push(shape);
                }
            }
        }
    }

    flat
}

// ============================================================================
// Structural constructors
// ============================================================================

impl Shape {
    /// Direct field
    pub fn field(iri: impl AsRef<str>, shape: Shape) -> Shape {
        Shape::edge(iri, false, None, shape)
    }

    /// Inverse field (object to subject)
    pub fn inverse_field(iri: impl AsRef<str>, shape: Shape) -> Shape {
        Shape::edge(iri, true, None, shape)
    }

    /// Direct field with an explicit alias
    pub fn labeled_field(label: impl Into<String>, iri: impl AsRef<str>, shape: Shape) -> Shape {
        Shape::edge(iri, false, Some(label.into()), shape)
    }

    fn edge(iri: impl AsRef<str>, inverse: bool, label: Option<String>, shape: Shape) -> Shape {
        if shape.is_empty_or() {
            // no value can be reached through an unsatisfiable edge
            return Shape::and([]);
        }

        Shape::Field(Field {
            iri: Arc::from(iri.as_ref()),
            inverse,
            label,
            shape: Box::new(shape),
        })
    }

    pub fn link(iri: impl AsRef<str>, shape: Shape) -> Shape {
        Shape::Link(Link {
            iri: Arc::from(iri.as_ref()),
            shape: Box::new(shape),
        })
    }
}

// ============================================================================
// Value and set constructors
// ============================================================================

impl Shape {
    pub fn datatype(iri: impl AsRef<str>) -> Shape {
        Shape::Datatype(Arc::from(iri.as_ref()))
    }

    pub fn clazz(iri: impl AsRef<str>) -> Shape {
        Shape::Clazz(Arc::from(iri.as_ref()))
    }

    pub fn range<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Shape {
        Shape::Range(values.into_iter().map(Into::into).collect())
    }

    /// Language tags; an empty set requires some language tag
    pub fn lang<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Shape {
        Shape::Lang(tags.into_iter().map(Into::into).collect())
    }

    /// At most one value per language tag
    pub fn localized() -> Shape {
        Shape::Localized
    }

    pub fn min_exclusive(limit: impl Into<Value>) -> Shape {
        Shape::MinExclusive(limit.into())
    }

    pub fn max_exclusive(limit: impl Into<Value>) -> Shape {
        Shape::MaxExclusive(limit.into())
    }

    pub fn min_inclusive(limit: impl Into<Value>) -> Shape {
        Shape::MinInclusive(limit.into())
    }

    pub fn max_inclusive(limit: impl Into<Value>) -> Shape {
        Shape::MaxInclusive(limit.into())
    }

    pub fn min_length(limit: usize) -> Shape {
        Shape::MinLength(limit)
    }

    pub fn max_length(limit: usize) -> Shape {
        Shape::MaxLength(limit)
    }

    pub fn pattern(expression: impl Into<String>) -> Shape {
        Shape::pattern_with_flags(expression, "")
    }

    pub fn pattern_with_flags(expression: impl Into<String>, flags: impl Into<String>) -> Shape {
        Shape::Pattern {
            expression: expression.into(),
            flags: flags.into(),
        }
    }

    /// Keyword match with stemming
    pub fn like(keywords: impl Into<String>) -> Shape {
        Shape::Like {
            keywords: keywords.into(),
            stemming: true,
        }
    }

    /// Keyword match on whole words
    pub fn like_exactly(keywords: impl Into<String>) -> Shape {
        Shape::Like {
            keywords: keywords.into(),
            stemming: false,
        }
    }

    pub fn stem(prefix: impl Into<String>) -> Shape {
        Shape::Stem(prefix.into())
    }

    pub fn min_count(limit: usize) -> Shape {
        Shape::MinCount(limit)
    }

    pub fn max_count(limit: usize) -> Shape {
        Shape::MaxCount(limit)
    }

    pub fn all<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Shape {
        Shape::All(values.into_iter().map(Into::into).collect())
    }

    pub fn any<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Shape {
        Shape::Any(values.into_iter().map(Into::into).collect())
    }

    pub fn meta(label: impl Into<String>, value: impl Into<String>) -> Shape {
        Shape::Meta {
            label: label.into(),
            value: value.into(),
        }
    }

    /// User-defined alias for the enclosing field
    pub fn alias(name: impl Into<String>) -> Shape {
        Shape::meta(ALIAS, name)
    }
}

// ============================================================================
// Shorthands
// ============================================================================

impl Shape {
    /// Exactly one value
    pub fn required() -> Shape {
        Shape::and([Shape::min_count(1), Shape::max_count(1)])
    }

    /// At most one value
    pub fn optional() -> Shape {
        Shape::max_count(1)
    }

    /// At least one value
    pub fn repeatable() -> Shape {
        Shape::min_count(1)
    }

    /// Any number of values
    pub fn multiple() -> Shape {
        Shape::and([])
    }

    /// Exactly the given values
    pub fn exactly<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Shape {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Shape::and([Shape::all(values.clone()), Shape::range(values)])
    }
}

// ============================================================================
// Guards
// ============================================================================

impl Shape {
    pub fn guard<S: Into<String>>(axis: Axis, values: impl IntoIterator<Item = S>) -> Shape {
        Shape::Guard(Guard {
            axis,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn role<S: Into<String>>(roles: impl IntoIterator<Item = S>) -> Shape {
        Shape::guard(Axis::Role, roles)
    }

    pub fn task<S: Into<String>>(tasks: impl IntoIterator<Item = S>) -> Shape {
        Shape::guard(Axis::Task, tasks)
    }

    pub fn area<S: Into<String>>(areas: impl IntoIterator<Item = S>) -> Shape {
        Shape::guard(Axis::Area, areas)
    }

    pub fn mode<S: Into<String>>(modes: impl IntoIterator<Item = S>) -> Shape {
        Shape::guard(Axis::Mode, modes)
    }

    /// Guard selecting shape parts used only for filtering
    pub fn filter_mode() -> Shape {
        Shape::mode([mode::FILTER])
    }

    /// Guard selecting shape parts shaping conveyed representations
    pub fn convey_mode() -> Shape {
        Shape::mode([mode::CONVEY])
    }

    /// Conjoin a filtering-only constraint, leaving result shaping untouched
    ///
    /// The filter is wrapped as `when(mode(filter), filter)` so redaction for
    /// conveying drops it. An empty filter leaves the shape unchanged.
    pub fn filtered(self, filter: Shape) -> Shape {
        if filter.is_empty_and() {
            self
        } else {
            Shape::and([self, Shape::filter_mode().then([filter])])
        }
    }
}

// ============================================================================
// Display
// ============================================================================

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: impl IntoIterator<Item = T>) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::And(shapes) => {
                write!(f, "and(")?;
                join(f, shapes)?;
                write!(f, ")")
            }
            Shape::Or(shapes) => {
                write!(f, "or(")?;
                join(f, shapes)?;
                write!(f, ")")
            }
            Shape::When(when) => write!(f, "when({}, {}, {})", when.test, when.pass, when.fail),
            Shape::Field(field) => match &field.label {
                Some(label) => write!(f, "field({}, <{}>, {})", label, field, field.shape),
                None => write!(f, "field(<{}>, {})", field, field.shape),
            },
            Shape::Link(link) => write!(f, "link(<{}>, {})", link.iri, link.shape),
            Shape::Datatype(iri) => write!(f, "datatype(<{}>)", iri),
            Shape::Clazz(iri) => write!(f, "clazz(<{}>)", iri),
            Shape::Range(values) => {
                write!(f, "range(")?;
                join(f, values)?;
                write!(f, ")")
            }
            Shape::Lang(tags) => {
                write!(f, "lang(")?;
                join(f, tags)?;
                write!(f, ")")
            }
            Shape::MinExclusive(limit) => write!(f, "minExclusive({})", limit),
            Shape::MaxExclusive(limit) => write!(f, "maxExclusive({})", limit),
            Shape::MinInclusive(limit) => write!(f, "minInclusive({})", limit),
            Shape::MaxInclusive(limit) => write!(f, "maxInclusive({})", limit),
            Shape::MinLength(limit) => write!(f, "minLength({})", limit),
            Shape::MaxLength(limit) => write!(f, "maxLength({})", limit),
            Shape::Pattern { expression, flags } if flags.is_empty() => {
                write!(f, "pattern({:?})", expression)
            }
            Shape::Pattern { expression, flags } => write!(f, "pattern({:?}, {:?})", expression, flags),
            Shape::Like { keywords, stemming } => write!(f, "like({:?}, {})", keywords, stemming),
            Shape::Stem(prefix) => write!(f, "stem({:?})", prefix),
            Shape::MinCount(limit) => write!(f, "minCount({})", limit),
            Shape::MaxCount(limit) => write!(f, "maxCount({})", limit),
            Shape::All(values) => {
                write!(f, "all(")?;
                join(f, values)?;
                write!(f, ")")
            }
            Shape::Any(values) => {
                write!(f, "any(")?;
                join(f, values)?;
                write!(f, ")")
            }
            Shape::Localized => write!(f, "localized()"),
            Shape::Meta { label, value } => write!(f, "meta({}, {:?})", label, value),
            Shape::Guard(guard) => write!(f, "{}", guard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_vocab::rdf;

    #[test]
    fn test_connectives_are_normalized() {
        let x = Shape::min_count(1);
        let y = Shape::max_count(2);

        assert_eq!(Shape::and([x.clone()]), x);
        assert_eq!(
            Shape::and([x.clone(), Shape::and([y.clone(), x.clone()])]),
            Shape::And(vec![x.clone(), y.clone()])
        );
        assert_eq!(
            Shape::or([Shape::or([x.clone()]), y.clone()]),
            Shape::Or(vec![x, y])
        );
    }

    #[test]
    fn test_when_collapses_resolved_tests() {
        let pass = Shape::min_count(1);
        let fail = Shape::max_count(0);

        assert_eq!(Shape::when(Shape::and([]), pass.clone(), fail.clone()), pass);
        assert_eq!(Shape::when(Shape::or([]), pass.clone(), fail.clone()), fail);

        let guarded = Shape::filter_mode().then([pass.clone()]);
        assert!(matches!(guarded, Shape::When(_)));
    }

    #[test]
    fn test_unsatisfiable_field_is_neutral() {
        assert_eq!(Shape::field(rdf::VALUE, Shape::or([])), Shape::and([]));
    }

    #[test]
    fn test_filtered() {
        let base = Shape::field(rdf::VALUE, Shape::and([]));

        assert_eq!(base.clone().filtered(Shape::and([])), base);

        let filtered = base.clone().filtered(Shape::min_count(1));
        assert_eq!(
            filtered,
            Shape::and([
                base,
                Shape::when(Shape::filter_mode(), Shape::min_count(1), Shape::and([]))
            ])
        );
    }

    #[test]
    fn test_display() {
        let shape = Shape::and([
            Shape::field(rdf::VALUE, Shape::required()),
            Shape::inverse_field(rdf::FIRST, Shape::any([1i64])),
        ]);

        assert_eq!(
            shape.to_string(),
            format!(
                "and(field(<{}>, and(minCount(1), maxCount(1))), field(<^{}>, any(\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>)))",
                rdf::VALUE,
                rdf::FIRST
            )
        );
    }
}
