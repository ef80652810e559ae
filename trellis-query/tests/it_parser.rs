//! Query parser tests over a small catalog shape

use pretty_assertions::assert_eq;
use serde_json::json;
use trellis_graph_ir::Term;
use trellis_json_ld::CodecOptions;
use trellis_query::{parse, Order, ParseError, Query, Step};
use trellis_shape::Shape;
use trellis_vocab::{rdf, rdfs, xsd};

const FOCUS: &str = "https://example.com/products/";
const PRICE: &str = "https://example.com/terms#price";
const VENDOR: &str = "https://example.com/terms#vendor";
const ITEM: &str = "https://example.com/terms#item";

fn product() -> Shape {
    Shape::and([
        Shape::field(rdfs::LABEL, Shape::and([Shape::required(), Shape::datatype(xsd::STRING)])),
        Shape::field(PRICE, Shape::and([Shape::optional(), Shape::datatype(xsd::DECIMAL)])),
        Shape::field(VENDOR, Shape::and([Shape::optional(), Shape::field(rdfs::LABEL, Shape::optional())])),
    ])
}

fn query(query: &str) -> Result<Query, ParseError> {
    parse(FOCUS, query, &product(), &CodecOptions::new())
}

// =============================================================================
// Items
// =============================================================================

#[test]
fn test_empty_query() {
    assert_eq!(query("").unwrap(), Query::items(product()));
}

#[test]
fn test_form_encoded_paths() {
    let shape = Shape::field(rdf::FIRST, Shape::field(rdf::REST, Shape::and([])));

    let query = parse(FOCUS, "first.rest=1&.offset=1&.limit=2", &shape, &CodecOptions::new()).unwrap();

    // form values are strings: `1` filters on the string literal over an untyped field

    assert_eq!(
        query,
        Query::Items {
            shape: shape
                .clone()
                .filtered(Shape::field(rdf::FIRST, Shape::field(rdf::REST, Shape::any(["1"])))),
            orders: Vec::new(),
            offset: 1,
            limit: 2,
        }
    );
}

#[test]
fn test_json_filters() {
    let parsed = query(
        &json!({
            ">=price": 10,
            "~label": "red shoe",
            "vendor.label": ["Acme", "Globex"],
            ".order": ["-price", "vendor.label"],
            ".limit": 20
        })
        .to_string(),
    )
    .unwrap();

    let filter = Shape::and([
        Shape::field(PRICE, Shape::min_inclusive(Term::decimal("10"))),
        Shape::field(rdfs::LABEL, Shape::like("red shoe")),
        Shape::field(VENDOR, Shape::field(rdfs::LABEL, Shape::any(["Acme", "Globex"]))),
    ]);

    assert_eq!(
        parsed,
        Query::Items {
            shape: product().filtered(filter),
            orders: vec![
                Order::decreasing(vec![Step::direct(PRICE)]),
                Order::increasing(vec![Step::direct(VENDOR), Step::direct(rdfs::LABEL)]),
            ],
            offset: 0,
            limit: 20,
        }
    );
}

#[test]
fn test_percent_encoded_json() {
    let parsed = query("%7B%22.offset%22%3A5%7D").unwrap();

    assert_eq!(parsed.offset(), 5);
    assert_eq!(parsed.shape(), &product());
}

#[test]
fn test_empty_text_filters_are_neutral() {
    assert_eq!(query(r#"{ "*label": "" }"#).unwrap(), Query::items(product()));
}

// =============================================================================
// Terms and stats
// =============================================================================

#[test]
fn test_terms_and_stats() {
    assert_eq!(
        query(".terms=vendor.label&.limit=10").unwrap(),
        Query::Terms {
            shape: product(),
            path: vec![Step::direct(VENDOR), Step::direct(rdfs::LABEL)],
            offset: 0,
            limit: 10,
        }
    );

    assert!(matches!(
        query(".stats=price").unwrap(),
        Query::Stats { path, .. } if path == vec![Step::direct(PRICE)]
    ));
}

// =============================================================================
// Links
// =============================================================================

#[test]
fn test_paths_traverse_links() {
    let shape = Shape::link(ITEM, Shape::field(rdfs::LABEL, Shape::and([])));

    let parsed = parse(FOCUS, "label=x", &shape, &CodecOptions::new()).unwrap();

    assert_eq!(
        parsed.shape(),
        &shape
            .clone()
            .filtered(Shape::link(ITEM, Shape::field(rdfs::LABEL, Shape::any(["x"]))))
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_errors() {
    assert!(matches!(query("color=red"), Err(ParseError::NotFound(step)) if step == "color"));
    assert!(matches!(query("vendor..label=x"), Err(ParseError::Syntax(_))));
    assert!(matches!(query("{ \"label\": "), Err(ParseError::Json(_))));
    assert!(matches!(query("%7B%22label%22"), Err(ParseError::Json(_))));
    assert!(matches!(query(r#"{ ".offset": -1 }"#), Err(ParseError::InvalidOffset(_))));
    assert!(matches!(query(".limit=x"), Err(ParseError::InvalidLimit(_))));
    assert!(matches!(query(r#"{ "^label": 1 }"#), Err(ParseError::Syntax(_))));
    assert!(matches!(query(r#"{ ".order": 1 }"#), Err(ParseError::Syntax(_))));
    assert!(matches!(query(r#"{ "label": [["x"]] }"#), Err(ParseError::Decode(_))));
}

#[test]
fn test_reserved_keyword_overrides_are_fatal() {
    let options = CodecOptions::new().with_keyword("@graph", "graph");

    let result = parse(FOCUS, "", &product(), &options);

    assert!(result.is_err_and(|e| e.is_fatal()));
}
