//! Shape-driven query parsing
//!
//! Parses request query strings into structured [`Query`] values over a
//! [`Shape`]: item listings with ordering and paging, term listings and
//! statistics along a path. Filter constraints are conjoined with the base
//! shape as filtering-only constraints, so the base shape still describes
//! how results are shaped.
//!
//! # Example
//!
//! ```
//! use trellis_query::{parse, Query};
//! use trellis_json_ld::CodecOptions;
//! use trellis_shape::Shape;
//! use trellis_vocab::rdf;
//!
//! let shape = Shape::field(rdf::FIRST, Shape::field(rdf::REST, Shape::and([])));
//!
//! let query = parse("https://example.com/", "first.rest=1&.offset=1&.limit=2", &shape, &CodecOptions::new()).unwrap();
//!
//! assert!(matches!(query, Query::Items { offset: 1, limit: 2, .. }));
//! ```

pub mod error;
pub mod parser;
pub mod query;

pub use error::{ParseError, Result};
pub use parser::QueryParser;
pub use query::{Order, Query, Step};

use trellis_json_ld::CodecOptions;
use trellis_shape::Shape;

/// Parse a request query string.
///
/// # Arguments
/// * `focus` - The IRI of the queried resource; relative IRIs in filter values resolve against it
/// * `query` - The raw query string: empty, JSON (plain or percent-encoded) or form-encoded
/// * `shape` - The base shape of the queried resources
/// * `options` - Keyword overrides
pub fn parse(focus: &str, query: &str, shape: &Shape, options: &CodecOptions) -> Result<Query> {
    let _span = tracing::debug_span!("parse_query", focus = %focus).entered();

    options.keywords.validate()?;

    QueryParser::new(focus, shape, &options.keywords).parse(query)
}
