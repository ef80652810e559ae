//! Span capture for the codec entry points
//!
//! A minimal `tracing_subscriber` layer records the names of the spans
//! opened while a codec operation runs on the current thread.

use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use trellis_graph_ir::Graph;
use trellis_json_ld::{decode, encode, scan, validate, CodecOptions};
use trellis_shape::Shape;
use trellis_vocab::rdfs;

const FOCUS: &str = "https://example.com/people/alice";

#[derive(Clone, Default)]
struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

impl SpanNames {
    fn names(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

struct SpanCaptureLayer(SpanNames);

impl<S> Layer<S> for SpanCaptureLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, _id: &tracing::span::Id, _ctx: Context<'_, S>) {
        self.0 .0.lock().unwrap().push(attrs.metadata().name());
    }
}

#[test]
fn test_entry_points_open_spans() {
    let names = SpanNames::default();
    let subscriber = tracing_subscriber::registry().with(SpanCaptureLayer(names.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let shape = Shape::field(rdfs::LABEL, Shape::optional());
    let options = CodecOptions::new();
    let json = json!({ "label": "Alice" });

    let graph = decode(FOCUS, &shape, &json, &options).unwrap();
    encode(FOCUS, &shape, &graph, &options).unwrap();
    validate(FOCUS, &shape, &json, &options).unwrap().unwrap();
    scan(FOCUS, &shape, &Graph::new(), &options).unwrap().unwrap();

    assert_eq!(names.names(), vec!["decode", "encode", "validate", "scan"]);
}
