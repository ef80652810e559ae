//! RDF graph - a set of triples
//!
//! The `Graph` type has set semantics: adding a triple twice is a no-op, so
//! decoders can union nested results without tracking what they emitted.
//! Iteration order is SPO lexicographic.

use crate::{BlankId, Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// A set of RDF triples
///
/// # Example
///
/// ```
/// use trellis_graph_ir::{Graph, Term};
///
/// let mut graph = Graph::new();
///
/// graph.add_triple(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::string("Alice"),
/// );
///
/// assert_eq!(graph.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
    /// Triples by object, for backward traversal
    incoming: BTreeMap<Term, BTreeSet<Triple>>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple to the graph
    pub fn add(&mut self, triple: Triple) {
        if self.triples.contains(&triple) {
            return;
        }

        self.incoming
            .entry(triple.object.clone())
            .or_default()
            .insert(triple.clone());
        self.triples.insert(triple);
    }

    /// Add a triple by components
    pub fn add_triple(&mut self, s: Term, p: Term, o: Term) {
        self.add(Triple::new(s, p, o));
    }

    /// Union another graph into this one
    pub fn merge(&mut self, other: Graph) {
        self.extend(other.triples);
    }

    /// Get the number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Check if the graph contains a triple
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Iterate over triples in SPO order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples linking `source` to other values through `iri`, forward or backward
    ///
    /// Forward edges are a contiguous SPO range; backward edges come from the
    /// object index. Either way the triples are yielded in SPO order.
    pub fn edges<'a>(
        &'a self,
        source: &'a Term,
        iri: &'a str,
        inverse: bool,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        let outgoing = (!inverse).then(move || {
            // blank nodes sort first and the empty label is the least of them
            let start = Triple::new(source.clone(), Term::iri(iri), Term::blank(""));

            self.triples
                .range(start..)
                .take_while(move |t| t.traverses(source, iri, false))
        });

        let incoming = if inverse { self.incoming.get(source) } else { None };

        outgoing.into_iter().flatten().chain(
            incoming
                .into_iter()
                .flatten()
                .filter(move |t| t.predicate_iri() == iri),
        )
    }

    /// Get all unique subjects in the graph
    pub fn subjects(&self) -> Vec<&Term> {
        let mut subjects: Vec<&Term> = self.triples.iter().map(|t| &t.subject).collect();
        subjects.dedup();
        subjects
    }

    /// Check if two graphs are equal up to a renaming of blank nodes
    ///
    /// Uses a backtracking search over blank node bijections, pruned by
    /// ground triples and node degree. Intended for the small graphs
    /// exchanged as single resource descriptions.
    pub fn is_isomorphic(&self, other: &Graph) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let ground = |g: &Graph| -> Vec<Triple> {
            g.iter().filter(|t| !has_blank(t)).cloned().collect()
        };

        if ground(self) != ground(other) {
            return false;
        }

        let ours = blank_degrees(self);
        let theirs = blank_degrees(other);

        if ours.len() != theirs.len() {
            return false;
        }

        let mut blanks: Vec<&BlankId> = ours.keys().copied().collect();
        blanks.sort();

        let mut mapping = FxHashMap::default();
        let mut used = FxHashSet::default();

        self.extend_mapping(other, &blanks, &ours, &theirs, &mut mapping, &mut used)
    }

    fn extend_mapping<'a>(
        &self,
        other: &'a Graph,
        blanks: &[&BlankId],
        ours: &FxHashMap<&BlankId, usize>,
        theirs: &FxHashMap<&'a BlankId, usize>,
        mapping: &mut FxHashMap<BlankId, BlankId>,
        used: &mut FxHashSet<&'a BlankId>,
    ) -> bool {
        let Some((next, rest)) = blanks.split_first() else {
            return self.iter().all(|t| other.contains(&rename(t, mapping)));
        };

        for (candidate, degree) in theirs {
            if used.contains(candidate) || ours.get(next) != Some(degree) {
                continue;
            }

            mapping.insert((*next).clone(), (*candidate).clone());
            used.insert(*candidate);

            let consistent = self
                .iter()
                .filter(|t| fully_mapped(t, mapping))
                .all(|t| other.contains(&rename(t, mapping)));

            if consistent && self.extend_mapping(other, rest, ours, theirs, mapping, used) {
                return true;
            }

            mapping.remove(*next);
            used.remove(candidate);
        }

        false
    }
}

fn has_blank(triple: &Triple) -> bool {
    triple.subject.is_blank() || triple.object.is_blank()
}

fn blank_degrees(graph: &Graph) -> FxHashMap<&BlankId, usize> {
    let mut degrees = FxHashMap::default();

    for triple in graph.iter() {
        for term in [&triple.subject, &triple.object] {
            if let Some(id) = term.as_blank() {
                *degrees.entry(id).or_insert(0) += 1;
            }
        }
    }

    degrees
}

fn fully_mapped(triple: &Triple, mapping: &FxHashMap<BlankId, BlankId>) -> bool {
    [&triple.subject, &triple.object]
        .into_iter()
        .all(|term| term.as_blank().map_or(true, |id| mapping.contains_key(id)))
}

fn rename(triple: &Triple, mapping: &FxHashMap<BlankId, BlankId>) -> Triple {
    let rename_term = |term: &Term| match term.as_blank().and_then(|id| mapping.get(id)) {
        Some(target) => Term::BlankNode(target.clone()),
        None => term.clone(),
    };

    Triple::new(
        rename_term(&triple.subject),
        triple.predicate.clone(),
        rename_term(&triple.object),
    )
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for triple in iter {
            self.add(triple);
        }
    }
}
