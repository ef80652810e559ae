//! Shape-driven JSON-LD codec
//!
//! This library maps between compacted JSON-LD descriptions of a focus
//! resource and RDF triples, driven by a [`Shape`]:
//! - Decoding JSON-LD into triples
//! - Encoding triples into JSON-LD, with an optional embedded `@context`
//! - Validating JSON-LD payloads before decoding
//! - Scanning triple sets for the description of a resource
//!
//! Shapes are driven (guards redacted, implied constraints expanded) by the
//! entry points below; the lower level [`Decoder`], [`Encoder`],
//! [`Validator`] and [`Scanner`] expect driver shapes.
//!
//! # Example
//!
//! ```
//! use trellis_json_ld::{decode, encode, CodecOptions};
//! use trellis_shape::Shape;
//! use trellis_vocab::rdf;
//! use serde_json::json;
//!
//! let shape = Shape::field(rdf::VALUE, Shape::max_count(1));
//! let options = CodecOptions::new();
//!
//! let graph = decode("https://example.com/x", &shape, &json!({ "value": "hi" }), &options).unwrap();
//! let json = encode("https://example.com/x", &shape, &graph, &options).unwrap();
//!
//! assert_eq!(json, json!({ "@id": "/x", "value": "hi" }));
//! ```

pub mod constraints;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod iri;
pub mod options;
pub mod scanner;
pub mod validator;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CodecError, DecodeError, Result};
pub use options::CodecOptions;
pub use scanner::Scanner;
pub use validator::Validator;

use serde_json::Value as JsonValue;
use std::sync::Arc;
use trellis_graph_ir::Graph;
use trellis_shape::{check_redacted, driver, Shape, ShapeError, Trace};

/// Drive a shape and check it, along with the keyword overrides, for codec use
fn prepare(shape: &Shape, options: &CodecOptions) -> std::result::Result<Arc<Shape>, ShapeError> {
    options.keywords.validate()?;

    let driven = driver(shape);
    check_redacted(&driven)?;

    Ok(driven)
}

/// Decode the JSON-LD description of a focus resource.
///
/// # Arguments
/// * `focus` - The IRI of the described resource; relative IRIs resolve against it
/// * `shape` - The (raw) shape of the description
/// * `json` - The JSON-LD object
/// * `options` - Keyword overrides
///
/// # Returns
/// The triples of the description, or a [`DecodeError`]; schema defects
/// are reported as fatal [`DecodeError::Shape`] errors.
pub fn decode(focus: &str, shape: &Shape, json: &JsonValue, options: &CodecOptions) -> Result<Graph> {
    let _span = tracing::debug_span!("decode", focus = %focus).entered();

    let driven = prepare(shape, options)?;

    Decoder::new(focus, &options.keywords).decode(&driven, json)
}

/// Decode a JSON-LD description from its textual form.
pub fn decode_str(focus: &str, shape: &Shape, text: &str, options: &CodecOptions) -> Result<Graph> {
    let json: JsonValue = serde_json::from_str(text)?;
    decode(focus, shape, &json, options)
}

/// Encode the description of a focus resource as compacted JSON-LD.
///
/// Only the triples reachable through the shape are written; IRIs sharing
/// the relativization root (`options.base`, or the root of `focus`) are
/// written root-relative.
pub fn encode(
    focus: &str,
    shape: &Shape,
    graph: &Graph,
    options: &CodecOptions,
) -> std::result::Result<JsonValue, CodecError> {
    let _span = tracing::debug_span!("encode", focus = %focus).entered();

    let driven = prepare(shape, options)?;

    let mut encoder = Encoder::new(focus, graph, &options.keywords);
    if let Some(base) = &options.base {
        encoder = encoder.with_root(Some(base.clone()));
    }

    encoder.encode(focus, &driven, options.embed_context)
}

/// Validate the JSON-LD description of a focus resource.
///
/// # Returns
/// `Ok(Ok(()))` if the description conforms to the shape, `Ok(Err(trace))`
/// with the nested issues otherwise; schema defects are errors.
pub fn validate(
    focus: &str,
    shape: &Shape,
    json: &JsonValue,
    options: &CodecOptions,
) -> std::result::Result<std::result::Result<(), Trace>, CodecError> {
    let _span = tracing::debug_span!("validate", focus = %focus).entered();

    let driven = prepare(shape, options)?;
    let trace = Validator::new(focus, &options.keywords).validate(&driven, json)?;

    Ok(if trace.is_empty() { Ok(()) } else { Err(trace) })
}

/// Scan a triple set for the description of a focus resource.
///
/// # Returns
/// `Ok(Ok(graph))` with the triples reachable through the shape if they
/// conform to it, `Ok(Err(trace))` otherwise; schema defects are errors.
pub fn scan(
    focus: &str,
    shape: &Shape,
    graph: &Graph,
    options: &CodecOptions,
) -> std::result::Result<std::result::Result<Graph, Trace>, CodecError> {
    let _span = tracing::debug_span!("scan", focus = %focus).entered();

    let driven = prepare(shape, options)?;

    Scanner::new(focus, graph, &options.keywords).scan(&driven)
}
