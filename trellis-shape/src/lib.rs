//! Constraint shapes for linked data resources
//!
//! A [`Shape`] describes both the structure and the constraints of a JSON-LD
//! representation: which edges a resource exposes, under which JSON property
//! names, with which values. The same shape drives decoding, encoding,
//! validation and query parsing in the sibling crates.
//!
//! # Overview
//!
//! - [`shape`]: the immutable constraint tree and its constructors
//! - [`probe`]: structural queries (datatype, cardinality, fields, languages)
//! - [`redact`]: guard evaluation against an execution context
//! - [`infer`]: implied constraints made explicit
//! - [`driver`]: redacted and expanded shapes, cached
//! - [`alias`]: JSON property names for shape edges
//! - [`trace`]: nested validation reports
//!
//! # Example
//!
//! ```
//! use trellis_shape::{aliases, driver, Keywords, Shape};
//! use trellis_vocab::rdfs;
//!
//! let shape = Shape::and([
//!     Shape::field(rdfs::LABEL, Shape::and([Shape::required(), Shape::datatype(trellis_vocab::xsd::STRING)])),
//!     Shape::field(rdfs::COMMENT, Shape::and([Shape::alias("notes"), Shape::optional()])),
//! ]);
//!
//! let driven = driver(&shape);
//! let aliases = aliases(&driven, &Keywords::new()).unwrap();
//!
//! assert!(aliases.get("label").is_some());
//! assert!(aliases.get("notes").is_some());
//! ```

pub mod alias;
pub mod driver;
pub mod error;
pub mod infer;
pub mod keywords;
pub mod probe;
pub mod redact;
pub mod shape;
pub mod trace;

pub use alias::{aliases, Aliases};
pub use driver::{drive, driver, DriverCache};
pub use error::{Result, ShapeError};
pub use infer::expand;
pub use keywords::Keywords;
pub use redact::{check_redacted, redact, GuardContext};
pub use shape::{Axis, Field, Guard, Link, Shape, Value, When};
pub use trace::Trace;
