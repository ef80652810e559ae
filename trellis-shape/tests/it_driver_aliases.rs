//! Driver and alias resolution over realistic shapes

use pretty_assertions::assert_eq;
use std::sync::Arc;
use trellis_shape::{aliases, driver, probe, Keywords, Shape, ShapeError};
use trellis_vocab::{internal, rdf, rdfs, xsd};

const EMPLOYEE: &str = "https://example.com/terms#Employee";
const CODE: &str = "https://example.com/terms#code";
const SENIORITY: &str = "https://example.com/terms#seniority";
const SUPERVISOR: &str = "https://example.com/terms#supervisor";
const SUBORDINATE: &str = "https://example.com/terms#subordinate";

fn employee() -> Shape {
    Shape::and([
        Shape::clazz(EMPLOYEE),
        Shape::field(rdf::TYPE, Shape::and([])),
        Shape::field(rdfs::LABEL, Shape::and([Shape::required(), Shape::datatype(xsd::STRING)])),
        Shape::field(CODE, Shape::and([Shape::required(), Shape::pattern(r"\d+")])),
        Shape::field(
            SENIORITY,
            Shape::and([
                Shape::optional(),
                Shape::datatype(xsd::INTEGER),
                Shape::min_inclusive(1i64),
                Shape::max_inclusive(5i64),
            ]),
        ),
        Shape::field(
            SUPERVISOR,
            Shape::and([
                Shape::optional(),
                Shape::field(rdfs::LABEL, Shape::and([])),
            ]),
        ),
        Shape::filter_mode().then([Shape::field(SUBORDINATE, Shape::min_count(1))]),
        Shape::convey_mode().then([Shape::field(
            SUBORDINATE,
            Shape::and([Shape::alias("reports"), Shape::field(rdfs::LABEL, Shape::and([]))]),
        )]),
    ])
}

// =============================================================================
// Driver
// =============================================================================

#[test]
fn driver_is_cached_and_deterministic() {
    let first = driver(&employee());
    let second = driver(&employee());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        aliases(&first, &Keywords::new()).unwrap(),
        aliases(&second, &Keywords::new()).unwrap()
    );
}

#[test]
fn driver_drops_filtering_constraints() {
    let driven = driver(&employee());
    let resolved = aliases(&driven, &Keywords::new()).unwrap();

    let reports = resolved.get("reports").unwrap();
    assert_eq!(probe::min_count(&reports.shape), None);
    assert_eq!(probe::datatype(&reports.shape), Some(internal::RESOURCE));
}

#[test]
fn driver_infers_resource_values() {
    let driven = driver(&employee());
    let resolved = aliases(&driven, &Keywords::new()).unwrap();

    assert_eq!(probe::datatype(&driven), Some(internal::RESOURCE));
    assert_eq!(
        probe::datatype(&resolved.get("@type").unwrap().shape),
        Some(internal::RESOURCE)
    );
    assert_eq!(
        probe::datatype(&resolved.get("supervisor").unwrap().shape),
        Some(internal::RESOURCE)
    );
    assert_eq!(
        probe::datatype(&resolved.get("label").unwrap().shape),
        Some(xsd::STRING)
    );
}

// =============================================================================
// Aliases
// =============================================================================

#[test]
fn aliases_follow_encounter_order() {
    let driven = driver(&employee());
    let resolved = aliases(&driven, &Keywords::new().with("@type", "type")).unwrap();

    let labels: Vec<&str> = resolved.iter().map(|(alias, _)| alias).collect();

    assert_eq!(
        labels,
        vec!["type", "label", "code", "seniority", "supervisor", "reports"]
    );
}

#[test]
fn keyword_overrides_reserve_aliases() {
    let shape = Shape::field("https://example.com/terms/id", Shape::and([]));

    assert!(aliases(&shape, &Keywords::new()).is_ok());
    assert_eq!(
        aliases(&shape, &Keywords::new().with("@id", "id")),
        Err(ShapeError::ReservedAlias {
            alias: "id".to_string(),
            iri: "https://example.com/terms/id".to_string(),
        })
    );
}
