//! Value and set constraint checks
//!
//! Shared by the JSON validator and the triple scanner: both reduce a shape
//! level to a group of terms and check the non-structural constraints here,
//! so the two report failures with the same wording.

use crate::iri;
use regex::{Regex, RegexBuilder};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use trellis_graph_ir::{value, Term};
use trellis_shape::{Shape, ShapeError, Trace, Value};

// Patterns are usually constant across a schema; compiled regexes are kept
// per thread and shared by every validation on it.
thread_local! {
    static REGEX_CACHE: RefCell<lru::LruCache<(String, String), Regex>> =
        RefCell::new(lru::LruCache::new(NonZeroUsize::new(32).unwrap_or(NonZeroUsize::MIN)));
}

/// Build a whole-text matching regex with optional flags (cached)
///
/// Supported flags: i (case-insensitive), m (multiline), s (dot-all), x (ignore whitespace).
pub fn pattern(expression: &str, flags: &str) -> Result<Regex, ShapeError> {
    let cache_key = (expression.to_string(), flags.to_string());
    let cached = REGEX_CACHE.with(|cache| cache.borrow_mut().get(&cache_key).cloned());

    if let Some(re) = cached {
        return Ok(re);
    }

    let malformed = |message: String| ShapeError::MalformedPattern {
        pattern: expression.to_string(),
        message,
    };

    let mut builder = RegexBuilder::new(&format!("^(?:{})$", expression));
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            c => return Err(malformed(format!("unknown regex flag '{}'", c))),
        }
    }

    let re = builder.build().map_err(|e| malformed(e.to_string()))?;

    REGEX_CACHE.with(|cache| {
        cache.borrow_mut().put(cache_key, re.clone());
    });

    Ok(re)
}

/// Check if every keyword matches a word of the text, ignoring case
///
/// With `stemming`, keywords only need to prefix a word.
pub fn like(text: &str, keywords: &str, stemming: bool) -> bool {
    let words: Vec<String> = words(text).map(str::to_lowercase).collect();

    words_of(keywords).all(|keyword| {
        words.iter().any(|word| {
            if stemming {
                word.starts_with(&keyword)
            } else {
                *word == keyword
            }
        })
    })
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    words(text).map(str::to_lowercase)
}

/// Check if two values are the same, numerics compared by value
pub fn same(x: &Term, y: &Term) -> bool {
    x == y || value::compare(x, y) == Some(Ordering::Equal)
}

/// Check a value or set constraint against the values of a group
///
/// Structural shapes (connectives, fields, links) and annotations pass; they
/// are traversed by the callers. `Focus` operands are resolved against `focus`.
pub fn check(shape: &Shape, focus: &str, values: &[Term]) -> Result<Trace, ShapeError> {
    let resolve = |operand: &Value| iri::resolve_value(focus, operand);

    let trace = match shape {
        Shape::Guard(guard) => return Err(ShapeError::UnredactedGuard(guard.to_string())),

        Shape::Datatype(datatype) => each(values, |v| value::is(v, datatype), |v| {
            format!("{} is not of datatype <{}>", v, datatype)
        }),

        Shape::Range(range) => {
            let range: Vec<Term> = range.iter().map(resolve).collect();
            each(values, |v| range.iter().any(|r| same(v, r)), |v| {
                format!("{} is not in the expected value range {}", v, set(&range))
            })
        }

        Shape::Lang(tags) => each(
            values,
            |v| match v.language() {
                Some(lang) => tags.is_empty() || tags.contains(lang),
                None => false,
            },
            |v| {
                let expected = if tags.is_empty() {
                    "*".to_string()
                } else {
                    tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
                };
                format!("{} is not in the expected language set {{{}}}", v, expected)
            },
        ),

        Shape::MinExclusive(limit) => bound(values, &resolve(limit), "strictly greater than", |o| {
            o == Ordering::Greater
        }),
        Shape::MaxExclusive(limit) => bound(values, &resolve(limit), "strictly less than", |o| {
            o == Ordering::Less
        }),
        Shape::MinInclusive(limit) => bound(values, &resolve(limit), "greater than or equal to", |o| {
            o != Ordering::Less
        }),
        Shape::MaxInclusive(limit) => bound(values, &resolve(limit), "less than or equal to", |o| {
            o != Ordering::Greater
        }),

        Shape::MinLength(limit) => each(values, |v| v.text().chars().count() >= *limit, |v| {
            format!("{} length is not greater than or equal to {}", v, limit)
        }),
        Shape::MaxLength(limit) => each(values, |v| v.text().chars().count() <= *limit, |v| {
            format!("{} length is not less than or equal to {}", v, limit)
        }),

        Shape::Pattern { expression, flags } => {
            let re = pattern(expression, flags)?;
            each(values, |v| re.is_match(v.text()), |v| {
                format!("{} textual value doesn't match <{}>", v, expression)
            })
        }

        Shape::Like { keywords, stemming } => each(values, |v| like(v.text(), keywords, *stemming), |v| {
            format!("{} textual value is not like <{}>", v, keywords)
        }),

        Shape::Stem(prefix) => each(values, |v| v.text().starts_with(prefix.as_str()), |v| {
            format!("{} textual value has not stem <{}>", v, prefix)
        }),

        Shape::MinCount(limit) if values.len() < *limit => {
            Trace::issue(format!("value count is not greater than or equal to {}", limit))
        }
        Shape::MaxCount(limit) if values.len() > *limit => {
            Trace::issue(format!("value count is not less than or equal to {}", limit))
        }

        Shape::All(expected) => {
            let expected: Vec<Term> = expected.iter().map(resolve).collect();
            if expected.iter().all(|e| values.iter().any(|v| same(v, e))) {
                Trace::new()
            } else {
                Trace::issue(format!("values don't include all expected values {}", set(&expected)))
            }
        }

        Shape::Any(expected) => {
            let expected: Vec<Term> = expected.iter().map(resolve).collect();
            if expected.iter().any(|e| values.iter().any(|v| same(v, e))) {
                Trace::new()
            } else {
                Trace::issue(format!(
                    "values don't include at least one of the expected values {}",
                    set(&expected)
                ))
            }
        }

        Shape::Localized => {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for lang in values.iter().filter_map(Term::language) {
                *counts.entry(lang).or_default() += 1;
            }
            Trace::issues(
                counts
                    .into_iter()
                    .filter(|&(_, count)| count > 1)
                    .map(|(lang, _)| format!("multiple values for <{}> language tag", lang)),
            )
        }

        _ => Trace::new(),
    };

    Ok(trace)
}

fn each(values: &[Term], test: impl Fn(&Term) -> bool, message: impl Fn(&Term) -> String) -> Trace {
    Trace::issues(values.iter().filter(|v| !test(v)).map(message))
}

fn bound(values: &[Term], limit: &Term, relation: &str, test: impl Fn(Ordering) -> bool) -> Trace {
    each(
        values,
        |v| value::compare(v, limit).is_some_and(&test),
        |v| format!("{} is not {} {}", v, relation, limit),
    )
}

fn set(values: &[Term]) -> String {
    let items: Vec<String> = values.iter().map(Term::to_string).collect();
    format!("{{{}}}", items.join(", "))
}
