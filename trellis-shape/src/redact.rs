//! Guard redaction
//!
//! Guards select shape parts by execution context (user role, task, area,
//! conveying vs. filtering mode). Redaction answers them once, upstream of
//! the codecs: a satisfied guard becomes `and()`, a failed one `or()`, and
//! conditionals on answered guards collapse to the chosen branch.

use crate::error::{Result, ShapeError};
use crate::shape::{mode, Axis, Guard, Shape};
use std::collections::{BTreeMap, BTreeSet};

/// How a [`GuardContext`] answers guards on one axis
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Every guard on the axis evaluates to the given status
    Status(bool),
    /// A guard holds if it names any of the given values
    Values(BTreeSet<String>),
}

/// Guard evaluators, one rule per axis; guards on other axes are retained
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GuardContext {
    rules: BTreeMap<Axis, Rule>,
}

impl GuardContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every guard on `axis` with `status`
    pub fn with_status(mut self, axis: Axis, status: bool) -> Self {
        self.rules.insert(axis, Rule::Status(status));
        self
    }

    /// Answer guards on `axis` by membership of any of `values`
    pub fn with_values<S: Into<String>>(mut self, axis: Axis, values: impl IntoIterator<Item = S>) -> Self {
        self.rules
            .insert(axis, Rule::Values(values.into_iter().map(Into::into).collect()));
        self
    }

    /// The context codecs run in: every role, task and area, conveying mode
    pub fn driver() -> Self {
        Self::new()
            .with_status(Axis::Role, true)
            .with_status(Axis::Task, true)
            .with_status(Axis::Area, true)
            .with_values(Axis::Mode, [mode::CONVEY])
    }

    /// Evaluate a guard; `None` if the context doesn't cover its axis
    pub fn evaluate(&self, guard: &Guard) -> Option<bool> {
        self.rules.get(&guard.axis).map(|rule| match rule {
            Rule::Status(status) => *status,
            Rule::Values(values) => !values.is_disjoint(&guard.values),
        })
    }
}

/// Resolve the guards answered by `context`
pub fn redact(shape: &Shape, context: &GuardContext) -> Shape {
    match shape {
        Shape::Guard(guard) => match context.evaluate(guard) {
            Some(true) => Shape::and([]),
            Some(false) => Shape::or([]),
            None => shape.clone(),
        },
        Shape::And(shapes) => Shape::and(shapes.iter().map(|s| redact(s, context))),
        Shape::Or(shapes) => Shape::or(shapes.iter().map(|s| redact(s, context))),
        Shape::When(when) => Shape::when(
            redact(&when.test, context),
            redact(&when.pass, context),
            redact(&when.fail, context),
        ),
        Shape::Field(field) => field.with_shape(redact(&field.shape, context)),
        Shape::Link(link) => Shape::link(link.iri.as_ref(), redact(&link.shape, context)),
        _ => shape.clone(),
    }
}

/// Fail if any guard is left in the shape
pub fn check_redacted(shape: &Shape) -> Result<()> {
    match shape {
        Shape::Guard(guard) => Err(ShapeError::UnredactedGuard(guard.to_string())),
        Shape::And(shapes) | Shape::Or(shapes) => shapes.iter().try_for_each(check_redacted),
        Shape::When(when) => {
            check_redacted(&when.test)?;
            check_redacted(&when.pass)?;
            check_redacted(&when.fail)
        }
        Shape::Field(field) => check_redacted(&field.shape),
        Shape::Link(link) => check_redacted(&link.shape),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_vocab::rdf;

    #[test]
    fn test_guards_collapse_conditionals() {
        let shape = Shape::field(
            rdf::VALUE,
            Shape::and([
                Shape::required(),
                Shape::filter_mode().then([Shape::min_count(5)]),
                Shape::convey_mode().then([Shape::max_count(3)]),
            ]),
        );

        assert_eq!(
            redact(&shape, &GuardContext::driver()),
            Shape::field(
                rdf::VALUE,
                Shape::and([Shape::min_count(1), Shape::max_count(1), Shape::max_count(3)])
            )
        );
    }

    #[test]
    fn test_uncovered_axes_are_retained() {
        let shape = Shape::role(["admin"]).then([Shape::min_count(1)]);
        let context = GuardContext::new().with_values(Axis::Mode, [mode::CONVEY]);

        assert_eq!(redact(&shape, &context), shape);
        assert!(matches!(
            check_redacted(&shape),
            Err(ShapeError::UnredactedGuard(_))
        ));

        let redacted = redact(&shape, &GuardContext::new().with_values(Axis::Role, ["user"]));
        assert_eq!(redacted, Shape::and([]));
        assert_eq!(check_redacted(&redacted), Ok(()));
    }

    #[test]
    fn test_failed_guard_inside_field_neutralizes_field() {
        let shape = Shape::field(rdf::VALUE, Shape::task(["delete"]));
        let context = GuardContext::new().with_values(Axis::Task, ["create"]);

        assert_eq!(redact(&shape, &context), Shape::and([]));
    }
}
