//! Trace notifications emitted during a run.

use crate::example_models::{coupled, default_rules, pulse_collector, test_registry};
use crate::simulation::RootCoordinator;
use crate::trace::{LogSink, TraceEvent, TraceFilter, TraceKind, TraceSelector};
use serde_json::json;

fn traced(end_time: f64, filter: TraceFilter) -> Vec<TraceEvent> {
    let registry = test_registry();
    let mut root = RootCoordinator::builder(&registry)
        .with_end_time(end_time)
        .with_root_model(coupled("top", &pulse_collector(default_rules())))
        .with_trace_filter(filter)
        .with_sink(Vec::<TraceEvent>::new())
        .build()
        .unwrap();
    root.run().unwrap();
    root.into_sink()
}

#[test]
fn select_decisions() {
    let events = traced(
        2.0,
        TraceFilter::new().with("/top", [TraceKind::Select]),
    );

    let decisions: Vec<(f64, &str)> = events
        .iter()
        .map(|e| (e.time, e.outcome.as_str()))
        .collect();
    assert_eq!(
        decisions,
        vec![(0.0, "proc"), (0.0, "gen:0"), (2.0, "gen:0")]
    );
    assert_eq!(events[0].payload, json!(["gen:0", "gen:1", "proc"]));
    assert_eq!(events[1].payload, json!(["gen:0", "gen:1"]));
    assert!(events.iter().all(|e| e.kind == TraceKind::Select && e.path == "/top"));
}

#[test]
fn state_changes() {
    let events = traced(
        4.0,
        TraceFilter::new().with("/top/proc", [TraceKind::State]),
    );

    let changes: Vec<(f64, &str, &serde_json::Value)> = events
        .iter()
        .map(|e| (e.time, e.outcome.as_str(), &e.payload))
        .collect();
    assert_eq!(
        changes,
        vec![
            (2.0, "job", &json!(0)),
            (2.0, "missed", &json!(1)),
            (4.0, "missed", &json!(2)),
            (4.0, "missed", &json!(3)),
        ]
    );
}

#[test]
fn filter_by_kind_and_wildcard() {
    let events = traced(
        2.0,
        TraceFilter::new()
            .with("*", [TraceKind::TimeAdvance])
            .with("/top/gen:1", [TraceSelector::All]),
    );

    assert!(events
        .iter()
        .all(|e| e.kind == TraceKind::TimeAdvance || e.path == "/top/gen:1"));
    // Initial time advances are reported at t=0 for every simulator.
    let initial: Vec<&str> = events
        .iter()
        .filter(|e| e.time == 0.0 && e.kind == TraceKind::TimeAdvance)
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(initial[..3], ["/top/gen:0", "/top/gen:1", "/top/proc"]);

    let gen1_output = events
        .iter()
        .find(|e| e.kind == TraceKind::Output && e.time == 2.0)
        .unwrap();
    assert_eq!(gen1_output.path, "/top/gen:1");
    assert_eq!(gen1_output.outcome, "pulse");
}

#[test]
fn empty_filter_reports_nothing() {
    assert!(traced(10.0, TraceFilter::new()).is_empty());
}

#[test]
fn log_sink_layout() {
    let events = traced(
        2.0,
        TraceFilter::new().with("*", [TraceKind::Select, TraceKind::External]),
    );
    let sink = LogSink::default();

    assert_eq!(
        sink.format(&events[0]),
        r#"t:0 /top             slct(.........) -> proc ["gen:0","gen:1","proc"]"#
    );
    let external = events
        .iter()
        .find(|e| e.kind == TraceKind::External)
        .unwrap();
    assert_eq!(
        sink.format(external),
        r#"t:2 /top/proc        dext(idle     ) -> busy {"port":"pulse","value":0}"#
    );
}
