//! Shape-driven triple scanner
//!
//! Validates the description of a focus resource held in a triple set,
//! following shape fields through the graph. On success, the scanner
//! returns the triples it traversed: the part of the graph the shape
//! describes.

use crate::constraints;
use crate::iri;
use crate::error::CodecError;
use trellis_graph_ir::{Graph, Term};
use trellis_shape::{aliases, Aliases, Keywords, Shape, ShapeError, Trace};

type Result<T> = std::result::Result<T, ShapeError>;

/// Scan outcome for a shape level: issues found and triples traversed
type Report = (Trace, Graph);

pub struct Scanner<'a> {
    focus: String,
    graph: &'a Graph,
    keywords: &'a Keywords,
}

impl<'a> Scanner<'a> {
    pub fn new(focus: &str, graph: &'a Graph, keywords: &'a Keywords) -> Self {
        Self {
            focus: iri::normalize(focus),
            graph,
            keywords,
        }
    }

    /// Scan the description of the focus resource
    ///
    /// The outer error reports schema defects, the inner one data that
    /// doesn't conform to the shape.
    pub fn scan(&self, shape: &Shape) -> std::result::Result<std::result::Result<Graph, Trace>, CodecError> {
        let focus = Term::iri(&self.focus);
        let (trace, graph) = self.group(shape, &[focus])?;

        Ok(if trace.is_empty() { Ok(graph) } else { Err(trace) })
    }

    fn group(&self, shape: &Shape, terms: &[Term]) -> Result<Report> {
        let aliases = aliases(shape, self.keywords)?;
        self.shape(shape, &aliases, terms)
    }

    fn shape(&self, shape: &Shape, aliases: &Aliases, terms: &[Term]) -> Result<Report> {
        match shape {
            Shape::And(shapes) => {
                let mut report = (Trace::new(), Graph::new());
                for shape in shapes {
                    report = merge(report, self.shape(shape, aliases, terms)?);
                }
                Ok(report)
            }

            Shape::Or(shapes) => {
                let mut graph = Graph::new();
                let mut matched = false;

                for shape in shapes {
                    let (trace, branch) = self.shape(shape, aliases, terms)?;
                    if trace.is_empty() {
                        matched = true;
                        graph.merge(branch);
                    }
                }

                Ok(if matched {
                    (Trace::new(), graph)
                } else {
                    (Trace::issue("values don't match any alternative"), Graph::new())
                })
            }

            Shape::When(when) => {
                let (test, _) = self.shape(&when.test, aliases, terms)?;
                let branch = if test.is_empty() { &when.pass } else { &when.fail };
                self.shape(branch, aliases, terms)
            }

            Shape::Link(link) => self.shape(&link.shape, aliases, terms),

            Shape::Field(field) => {
                let alias = aliases.alias_of(field).ok_or_else(|| ShapeError::UndefinedAlias {
                    iri: field.to_string(),
                })?;

                let mut report = (Trace::new(), Graph::new());

                for source in terms {
                    let mut traversed = Graph::new();
                    let mut targets: Vec<Term> = Vec::new();

                    for triple in self.graph.edges(source, &field.iri, field.inverse) {
                        let target = triple.target(field.inverse);
                        if !targets.contains(target) {
                            targets.push(target.clone());
                        }
                        traversed.add(triple.clone());
                    }

                    let (trace, nested) = self.group(&field.shape, &targets)?;

                    traversed.merge(nested);
                    report = merge(report, (Trace::field(alias, trace), traversed));
                }

                Ok(report)
            }

            shape => Ok((constraints::check(shape, &self.focus, terms)?, Graph::new())),
        }
    }
}

fn merge((trace, mut graph): Report, (other, triples): Report) -> Report {
    graph.merge(triples);
    (trace.merge(other), graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_graph_ir::Triple;
    use trellis_shape::drive;
    use trellis_vocab::{rdfs, xsd};

    const ALICE: &str = "https://example.com/people/alice";
    const BOB: &str = "https://example.com/people/bob";
    const KNOWS: &str = "https://example.com/terms#knows";

    fn triple(s: &str, p: &str, o: Term) -> Triple {
        Triple::new(Term::iri(s), Term::iri(p), o)
    }

    fn scan(shape: &Shape, graph: &Graph) -> std::result::Result<Graph, Trace> {
        let keywords = Keywords::new();
        Scanner::new(ALICE, graph, &keywords).scan(&drive(shape)).unwrap()
    }

    #[test]
    fn test_reachable_triples() {
        let shape = Shape::field(KNOWS, Shape::field(rdfs::LABEL, Shape::and([])));

        let graph = Graph::from_iter([
            triple(ALICE, KNOWS, Term::iri(BOB)),
            triple(BOB, rdfs::LABEL, Term::string("Bob")),
            triple(BOB, KNOWS, Term::iri(ALICE)),
            triple(ALICE, rdfs::COMMENT, Term::string("unrelated")),
        ]);

        assert_eq!(
            scan(&shape, &graph).unwrap(),
            Graph::from_iter([
                triple(ALICE, KNOWS, Term::iri(BOB)),
                triple(BOB, rdfs::LABEL, Term::string("Bob")),
            ])
        );
    }

    #[test]
    fn test_inverse_edges() {
        let shape = Shape::inverse_field(KNOWS, Shape::and([]));
        let graph = Graph::from_iter([triple(BOB, KNOWS, Term::iri(ALICE))]);

        assert_eq!(scan(&shape, &graph).unwrap(), graph);
    }

    #[test]
    fn test_issues_nest_under_aliases() {
        let shape = Shape::field(
            KNOWS,
            Shape::field(rdfs::LABEL, Shape::and([Shape::required(), Shape::datatype(xsd::STRING)])),
        );

        let graph = Graph::from_iter([
            triple(ALICE, KNOWS, Term::iri(BOB)),
            triple(BOB, rdfs::LABEL, Term::integer(1)),
        ]);

        let trace = scan(&shape, &graph).unwrap_err();

        assert_eq!(
            trace.get("knows").unwrap().get("label").unwrap().messages(),
            [format!("{} is not of datatype <{}>", Term::integer(1), xsd::STRING)]
        );
    }

    #[test]
    fn test_alternatives_merge_matching_branches() {
        let shape = Shape::or([
            Shape::field(rdfs::LABEL, Shape::min_count(1)),
            Shape::field(rdfs::COMMENT, Shape::min_count(1)),
        ]);

        let graph = Graph::from_iter([triple(ALICE, rdfs::COMMENT, Term::string("note"))]);
        assert_eq!(scan(&shape, &graph).unwrap(), graph);

        let trace = scan(&shape, &Graph::new()).unwrap_err();
        assert_eq!(trace.messages(), ["values don't match any alternative"]);
    }
}
