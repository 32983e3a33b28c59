//! End-to-end flows through the facade crate
//!
//! Viewport pans trigger gap fetches, merged annotations become
//! navigable and draggable, and a committed edit survives a later
//! overlapping fetch of the same region.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Map;
use tracemark::{
    AnnotationEngine, AnnotationId, AnnotationPage, AnnotationQuery, AnnotationTransport,
    AuthToken, EngineConfig, Layer, LayerColor, LayerId, PointerMode, RawAnnotation, Result,
    TokenProvider, ViewportMetrics,
};

struct StaticToken;

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<AuthToken> {
        Ok(AuthToken("tok".to_string()))
    }
}

#[derive(Default)]
struct ScriptedTransport {
    script: RefCell<VecDeque<Result<AnnotationPage>>>,
    queries: RefCell<Vec<AnnotationQuery>>,
}

impl ScriptedTransport {
    fn push(&self, response: Result<AnnotationPage>) {
        self.script.borrow_mut().push_back(response);
    }

    fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl AnnotationTransport for ScriptedTransport {
    fn fetch_annotations(&self, query: &AnnotationQuery) -> Result<AnnotationPage> {
        self.queries.borrow_mut().push(query.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(AnnotationPage::default()))
    }
}

fn page(items: Vec<RawAnnotation>) -> AnnotationPage {
    AnnotationPage {
        annotations: tracemark::ResultsEnvelope { results: items },
        linked_packages: Map::new(),
    }
}

fn item(id: i64, start: i64, end: i64) -> RawAnnotation {
    RawAnnotation {
        id: Some(id),
        label: Some(format!("a{id}")),
        start: Some(start),
        end: Some(end),
        layer_id: Some(1),
        ..Default::default()
    }
}

fn metrics() -> ViewportMetrics {
    ViewportMetrics {
        start_time: 0,
        time_per_px: 10.0,
        width_px: 100.0,
        lane_top: 0.0,
        lane_bottom: 20.0,
    }
}

fn engine() -> AnnotationEngine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut engine = AnnotationEngine::new(EngineConfig::new("viewer-1"), metrics());
    engine.add_layer(Layer::new(
        Some(LayerId(1)),
        "events",
        LayerColor::from_hex("#cc4400").unwrap(),
    ));
    engine
}

#[test]
fn test_pan_fetch_navigate_drag_cycle() {
    let mut engine = engine();
    let transport = ScriptedTransport::default();
    // annotation at 200..500 time = 20..50 px
    transport.push(Ok(page(vec![item(1, 200, 500)])));

    engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();

    // temporal navigation sees the merged annotation
    assert_eq!(engine.find_next_annotation(0).unwrap().id, AnnotationId(1));
    assert_eq!(
        engine.find_previous_annotation(999).unwrap().id,
        AnnotationId(1)
    );

    // drag the right edge out by 20 px (= 200 time units) and commit
    assert_eq!(
        engine.pointer_move(50.0, 10.0).mode,
        PointerMode::ResizeHorizontal
    );
    engine.pointer_down(50.0, 10.0);
    engine.pointer_move(70.0, 10.0);
    let committed = engine.pointer_up().committed.expect("commit on release");
    assert_eq!(committed.start, 200);
    assert_eq!(committed.end(), 700);

    // a later overlapping fetch of the same region is suppressed by
    // coverage, so the local edit is not clobbered
    engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();
    assert_eq!(transport.query_count(), 1);
    let ann = engine
        .store()
        .layer(LayerId(1))
        .unwrap()
        .annotation(AnnotationId(1))
        .unwrap();
    assert_eq!(ann.end(), 700);
}

#[test]
fn test_pan_extends_coverage_incrementally() {
    let mut engine = engine();
    let transport = ScriptedTransport::default();

    engine
        .check_annotation_range(0, 500, &StaticToken, &transport)
        .unwrap();
    // panning right only fetches the uncovered tail
    engine
        .check_annotation_range(300, 800, &StaticToken, &transport)
        .unwrap();
    assert_eq!(transport.query_count(), 2);
    let queries = transport.queries.borrow();
    assert_eq!(
        (queries[1].range.start, queries[1].range.end),
        (500, 800)
    );
}

#[test]
fn test_selection_flow_through_facade() {
    let mut engine = engine();
    let transport = ScriptedTransport::default();
    transport.push(Ok(page(vec![item(1, 200, 500), item(2, 600, 900)])));
    engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();

    // hover the body of annotation 1 and release
    assert_eq!(engine.pointer_move(35.0, 10.0).mode, PointerMode::Select);
    engine.pointer_down(35.0, 10.0);
    let update = engine.pointer_up();
    assert_eq!(update.selected, Some(AnnotationId(1)));

    let layer = engine.store().layer(LayerId(1)).unwrap();
    assert!(layer.annotation(AnnotationId(1)).unwrap().selected);
    assert!(!layer.annotation(AnnotationId(2)).unwrap().selected);
}

#[test]
fn test_render_list_tracks_viewport() {
    let mut engine = engine();
    let transport = ScriptedTransport::default();
    transport.push(Ok(page(vec![item(1, 200, 500), item(2, 5000, 6000)])));
    engine
        .check_annotation_range(0, 10_000, &StaticToken, &transport)
        .unwrap();

    // only the first annotation is on screen at the initial viewport
    assert_eq!(engine.render_list().len(), 1);

    // pan to 4000.. with the same scale; only the second is visible
    engine.set_viewport(ViewportMetrics {
        start_time: 4000,
        ..metrics()
    });
    let list = engine.render_list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, AnnotationId(2));
}
