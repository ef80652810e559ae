//! RDF graph model shared by the Trellis codec, validator and query parser
//!
//! This crate provides canonical types for representing RDF values and
//! triple sets independently of any serialization format.
//!
//! # Key Design Principles
//!
//! 1. **Absolute IRIs only** - All IRIs are stored resolved. Relativization
//!    is handled by encoders at output time.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype, never
//!    optional. Plain strings use `xsd:string`, language-tagged strings use
//!    `rdf:langString`.
//!
//! 3. **Set semantics** - The `Graph` type is a set of triples, so unions of
//!    partial results never duplicate statements.
//!
//! # Example
//!
//! ```
//! use trellis_graph_ir::{Graph, Term};
//!
//! let mut graph = Graph::new();
//!
//! graph.add_triple(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! );
//!
//! assert_eq!(graph.subjects().len(), 1);
//! ```

pub mod datatype;
mod graph;
mod term;
mod triple;
pub mod value;

pub use datatype::Datatype;
pub use graph::Graph;
pub use term::{BlankId, Term};
pub use triple::Triple;
