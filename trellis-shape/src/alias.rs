//! Field alias resolution
//!
//! Every field reachable from a shape level gets a JSON property name: an
//! explicit alias if the shape declares one, the `@type` keyword (or its
//! override) for `rdf:type`, else a name derived from the edge IRI. Fields
//! sharing the same edge are merged, their nested shapes conjoined.

use crate::error::{Result, ShapeError};
use crate::keywords::{is_word, Keywords};
use crate::probe;
use crate::shape::{Field, Shape};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use trellis_vocab::{keywords, rdf};

/// Last path or fragment segment of an IRI, ignoring conventional suffixes
static NAMED_IRI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([/#:])(?P<name>[^/#:]+)(/|#|#_|#id|#this)?$").unwrap());

/// Alias to field mapping, in field encounter order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aliases {
    entries: Vec<(String, Field)>,
    index: FxHashMap<String, usize>,
}

impl Aliases {
    /// The field behind an alias
    pub fn get(&self, alias: &str) -> Option<&Field> {
        self.index.get(alias).map(|&i| &self.entries[i].1)
    }

    /// The alias of the field sharing an edge with `field`
    pub fn alias_of(&self, field: &Field) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, f)| f.same_edge(field))
            .map(|(alias, _)| alias.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.entries.iter().map(|(alias, field)| (alias.as_str(), field))
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.index.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the aliases of the fields at the top level of `shape`
pub fn aliases(shape: &Shape, keywords: &Keywords) -> Result<Aliases> {
    let mut result = Aliases::default();

    for field in merge(probe::fields(shape)) {
        let alias = resolve(&field, keywords)?;

        if let Some(&i) = result.index.get(&alias) {
            return Err(ShapeError::ClashingAliases {
                first: result.entries[i].1.to_string(),
                second: field.to_string(),
            });
        }

        result.index.insert(alias.clone(), result.entries.len());
        result.entries.push((alias, field));
    }

    Ok(result)
}

fn merge(fields: Vec<&Field>) -> Vec<Field> {
    let mut merged: Vec<Field> = Vec::with_capacity(fields.len());

    for field in fields {
        match merged.iter_mut().find(|f| f.same_edge(field)) {
            Some(existing) => {
                let mut shapes = vec![(*existing.shape).clone(), (*field.shape).clone()];

                match (&existing.label, &field.label) {
                    (None, label) => existing.label = label.clone(),
                    // conflicting labels are reported by alias resolution
                    (Some(first), Some(second)) if first != second => {
                        shapes.push(Shape::alias(second.clone()))
                    }
                    _ => {}
                }

                existing.shape = Box::new(Shape::and(shapes));
            }
            None => merged.push(field.clone()),
        }
    }

    merged
}

fn resolve(field: &Field, overrides: &Keywords) -> Result<String> {
    let mut declared: BTreeSet<&str> = probe::aliases(&field.shape);
    if let Some(label) = &field.label {
        declared.insert(label.as_str());
    }

    if declared.len() > 1 {
        return Err(ShapeError::MultipleAliases {
            iri: field.to_string(),
            aliases: declared.into_iter().map(String::from).collect(),
        });
    }

    let alias = match declared.into_iter().next() {
        Some(alias) => alias.to_string(),
        None if field.is_direct() && field.iri.as_ref() == rdf::TYPE => {
            return Ok(overrides.alias(keywords::TYPE).to_string());
        }
        None => derive(field)?,
    };

    if !is_word(&alias) {
        return Err(ShapeError::MalformedAlias {
            alias,
            iri: field.to_string(),
        });
    }

    if alias.starts_with('@') || overrides.is_reserved(&alias) {
        return Err(ShapeError::ReservedAlias {
            alias,
            iri: field.to_string(),
        });
    }

    Ok(alias)
}

fn derive(field: &Field) -> Result<String> {
    let name = NAMED_IRI
        .captures(&field.iri)
        .and_then(|captures| captures.name("name"))
        .map(|name| name.as_str())
        .ok_or_else(|| ShapeError::UndefinedAlias {
            iri: field.to_string(),
        })?;

    Ok(if field.inverse {
        format!("{}Of", name)
    } else {
        name.to_string()
    })
}
