//! Structured queries over shapes
//!
//! A query pairs a shape (the base shape, plus filtering-only constraints)
//! with what to retrieve: matching items, the distinct terms reachable
//! through a path, or statistics over those terms.

use std::fmt;
use std::sync::Arc;
use trellis_shape::{Field, Shape};

/// A step along a path of shape edges
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub iri: Arc<str>,
    pub inverse: bool,
}

impl Step {
    pub fn direct(iri: impl AsRef<str>) -> Self {
        Self {
            iri: Arc::from(iri.as_ref()),
            inverse: false,
        }
    }

    pub fn inverse(iri: impl AsRef<str>) -> Self {
        Self {
            iri: Arc::from(iri.as_ref()),
            inverse: true,
        }
    }
}

impl From<&Field> for Step {
    fn from(field: &Field) -> Self {
        Self {
            iri: field.iri.clone(),
            inverse: field.inverse,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "^")?;
        }
        write!(f, "<{}>", self.iri)
    }
}

/// Sort criterion: a path from the focus and a direction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Order {
    pub path: Vec<Step>,
    /// Decreasing order
    pub inverse: bool,
}

impl Order {
    pub fn increasing(path: Vec<Step>) -> Self {
        Self { path, inverse: false }
    }

    pub fn decreasing(path: Vec<Step>) -> Self {
        Self { path, inverse: true }
    }
}

/// A parsed query
///
/// `offset` and `limit` count results; a zero limit means no limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// Resources matching the shape
    Items {
        shape: Shape,
        orders: Vec<Order>,
        offset: usize,
        limit: usize,
    },
    /// Distinct values reachable through `path`, with their counts
    Terms {
        shape: Shape,
        path: Vec<Step>,
        offset: usize,
        limit: usize,
    },
    /// Aggregate statistics over the values reachable through `path`
    Stats {
        shape: Shape,
        path: Vec<Step>,
        offset: usize,
        limit: usize,
    },
}

impl Query {
    /// Default item listing
    pub fn items(shape: Shape) -> Self {
        Query::Items {
            shape,
            orders: Vec::new(),
            offset: 0,
            limit: 0,
        }
    }

    pub fn shape(&self) -> &Shape {
        match self {
            Query::Items { shape, .. } | Query::Terms { shape, .. } | Query::Stats { shape, .. } => shape,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Query::Items { offset, .. } | Query::Terms { offset, .. } | Query::Stats { offset, .. } => *offset,
        }
    }

    pub fn limit(&self) -> usize {
        match self {
            Query::Items { limit, .. } | Query::Terms { limit, .. } | Query::Stats { limit, .. } => *limit,
        }
    }
}
