//! Fetch orchestration integration tests
//!
//! Exercise gap planning, payload normalization, coverage recording,
//! truncation clamping, and failure recovery against a scripted
//! transport.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Map;
use tracemark_core::{
    AnnotationId, AnnotationPage, Error, Layer, LayerColor, LayerId, RawAnnotation,
    ResultsEnvelope, Result,
};
use tracemark_engine::{
    AnnotationEngine, AnnotationQuery, AnnotationTransport, AuthToken, EngineConfig,
    TokenProvider, ViewportMetrics,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct StaticToken;

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<AuthToken> {
        Ok(AuthToken("tok".to_string()))
    }
}

struct NoToken;

impl TokenProvider for NoToken {
    fn token(&self) -> Result<AuthToken> {
        Err(Error::Auth("session expired".to_string()))
    }
}

/// Replays a script of responses in order and records every query.
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

    fn last_query(&self) -> AnnotationQuery {
        self.queries.borrow().last().unwrap().clone()
    }
}

impl AnnotationTransport for ScriptedTransport {
    fn fetch_annotations(&self, query: &AnnotationQuery) -> Result<AnnotationPage> {
        self.queries.borrow_mut().push(query.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(empty_page()))
    }
}

fn empty_page() -> AnnotationPage {
    AnnotationPage::default()
}

fn page(items: Vec<RawAnnotation>) -> AnnotationPage {
    AnnotationPage {
        annotations: ResultsEnvelope { results: items },
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

fn engine_with_layers(config: EngineConfig, ids: &[Option<i64>]) -> AnnotationEngine {
    let mut engine = AnnotationEngine::new(config, metrics());
    for (i, id) in ids.iter().enumerate() {
        engine.add_layer(Layer::new(
            id.map(LayerId),
            format!("layer-{i}"),
            LayerColor::from_hex("#336699").unwrap(),
        ));
    }
    engine
}

fn annotation_starts(engine: &AnnotationEngine, layer: i64) -> Vec<i64> {
    engine
        .store()
        .layer(LayerId(layer))
        .unwrap()
        .annotations
        .iter()
        .map(|a| a.start)
        .collect()
}

#[test]
fn test_fill_fetches_uncovered_range_once() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let transport = ScriptedTransport::default();
    transport.push(Ok(page(vec![item(1, 100, 200), item(2, 400, 450)])));

    let report = engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();
    assert_eq!(report.requested, 1);
    assert_eq!(report.merged, 1);
    assert!(report.failures.is_empty());
    assert_eq!(annotation_starts(&engine, 1), vec![100, 400]);

    // entirely inside the covered range: no network call
    let report = engine
        .check_annotation_range(100, 900, &StaticToken, &transport)
        .unwrap();
    assert_eq!(report.requested, 0);
    assert_eq!(transport.query_count(), 1);
}

#[test]
fn test_query_carries_viewer_scope_and_token() {
    let mut engine = engine_with_layers(EngineConfig::new("viewer-9"), &[Some(4)]);
    let transport = ScriptedTransport::default();
    engine
        .check_annotation_range(10, 90, &StaticToken, &transport)
        .unwrap();

    let query = transport.last_query();
    assert_eq!(query.viewer_id, "viewer-9");
    assert_eq!(query.layer_id, LayerId(4));
    assert_eq!(query.api_key, AuthToken("tok".to_string()));
    assert_eq!(query.limit, 500);
    assert_eq!((query.range.start, query.range.end), (10, 90));
}

#[test]
fn test_zero_result_response_still_covers() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let transport = ScriptedTransport::default();
    transport.push(Ok(empty_page()));

    engine
        .check_annotation_range(0, 500, &StaticToken, &transport)
        .unwrap();
    // "no data" is recorded; the range is not re-requested
    let report = engine
        .check_annotation_range(0, 500, &StaticToken, &transport)
        .unwrap();
    assert_eq!(report.requested, 0);
    assert_eq!(transport.query_count(), 1);
}

#[test]
fn test_partial_overlap_requests_only_the_gap() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let transport = ScriptedTransport::default();
    engine
        .check_annotation_range(0, 100, &StaticToken, &transport)
        .unwrap();

    engine
        .check_annotation_range(50, 180, &StaticToken, &transport)
        .unwrap();
    let query = transport.last_query();
    assert_eq!((query.range.start, query.range.end), (100, 180));
}

#[test]
fn test_failed_fetch_reverts_and_retries() {
    init_tracing();
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let transport = ScriptedTransport::default();
    transport.push(Err(Error::Network("503".to_string())));

    let report = engine
        .check_annotation_range(0, 100, &StaticToken, &transport)
        .unwrap();
    assert_eq!(report.merged, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], (LayerId(1), Error::Network(_))));

    // the range reverted to uncovered; the next pass retries it
    transport.push(Ok(page(vec![item(1, 10, 20)])));
    let report = engine
        .check_annotation_range(0, 100, &StaticToken, &transport)
        .unwrap();
    assert_eq!(report.merged, 1);
    assert_eq!(annotation_starts(&engine, 1), vec![10]);
}

#[test]
fn test_token_failure_aborts_and_unwinds() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let transport = ScriptedTransport::default();

    let err = engine
        .check_annotation_range(0, 100, &NoToken, &transport)
        .unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(transport.query_count(), 0);

    // markings were unwound: the same range plans again
    let planned = engine.plan_requests(0, 100).unwrap();
    assert_eq!(planned.len(), 1);
}

#[test]
fn test_truncated_page_clamps_coverage() {
    let mut config = EngineConfig::new("v1");
    config.page_limit = 2;
    let mut engine = engine_with_layers(config, &[Some(1)]);
    let transport = ScriptedTransport::default();
    // page exactly at the cap; max start is 400
    transport.push(Ok(page(vec![item(1, 100, 150), item(2, 400, 420)])));

    engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();

    // only [0, 400) is covered; the remainder is requested next pass
    transport.push(Ok(page(vec![item(3, 600, 700)])));
    engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();
    let query = transport.last_query();
    assert_eq!((query.range.start, query.range.end), (400, 1000));
    assert_eq!(annotation_starts(&engine, 1), vec![100, 400, 600]);
}

#[test]
fn test_layer_without_id_is_skipped() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[None, Some(2)]);
    let transport = ScriptedTransport::default();
    transport.push(Ok(page(vec![item(1, 10, 20)])));

    let report = engine
        .check_annotation_range(0, 100, &StaticToken, &transport)
        .unwrap();
    // only the persisted layer was fetched
    assert_eq!(report.requested, 1);
    assert_eq!(transport.last_query().layer_id, LayerId(2));
}

#[test]
fn test_hidden_layer_is_not_fetched() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    engine.set_layer_visible(LayerId(1), false).unwrap();
    let transport = ScriptedTransport::default();

    let report = engine
        .check_annotation_range(0, 100, &StaticToken, &transport)
        .unwrap();
    assert_eq!(report.requested, 0);
}

#[test]
fn test_malformed_items_are_defaulted_not_dropped() {
    init_tracing();
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let transport = ScriptedTransport::default();
    transport.push(Ok(page(vec![
        RawAnnotation::default(), // everything missing
        item(2, 300, 350),
    ])));

    engine
        .check_annotation_range(0, 1000, &StaticToken, &transport)
        .unwrap();
    let layer = engine.store().layer(LayerId(1)).unwrap();
    assert_eq!(layer.annotations.len(), 2);
    let defaulted = layer.annotation(AnnotationId(0)).unwrap();
    assert_eq!(defaulted.start, 0);
    assert_eq!(defaulted.duration, 0);
    assert!(defaulted.all_channels);
    assert_eq!(defaulted.layer_id, LayerId(1));
}

#[test]
fn test_overlapping_responses_merge_idempotently() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);

    // two overlapping split-phase requests both report annotation 7
    let first = engine.plan_requests(0, 100).unwrap();
    let second = engine.plan_requests(50, 150).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!((second[0].range.start, second[0].range.end), (100, 150));

    engine
        .apply_response(first[0].id, page(vec![item(7, 60, 90)]))
        .unwrap();
    engine
        .apply_response(second[0].id, page(vec![item(7, 60, 90)]))
        .unwrap();

    assert_eq!(annotation_starts(&engine, 1), vec![60]);
    // fully covered now
    assert!(engine.plan_requests(0, 150).unwrap().is_empty());
}

#[test]
fn test_pending_request_suppresses_duplicates() {
    let mut engine = engine_with_layers(EngineConfig::new("v1"), &[Some(1)]);
    let planned = engine.plan_requests(0, 100).unwrap();
    assert_eq!(planned.len(), 1);

    // the same viewport plans nothing while the fetch is in flight
    assert!(engine.plan_requests(0, 100).unwrap().is_empty());

    engine.fail_request(planned[0].id, &Error::Network("timeout".to_string()));
    assert_eq!(engine.plan_requests(0, 100).unwrap().len(), 1);
}
