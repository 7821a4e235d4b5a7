mod common;
use common::*;

use dagflow::graphs::GraphBuilder;
use dagflow::observers::{MemorySink, NodeRecord, ObserverSink};
use dagflow::runtimes::RunOptions;
use dagflow::types::NodeStatus;
use serde_json::json;
use std::io;
use std::time::Duration;

async fn drain() {
    // Records are dispatched on a detached task; give it a beat.
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn every_node_yields_a_record() {
    let sink = MemorySink::new();
    let flow = diamond();

    let (ctx, _) = flow
        .run_with(RunOptions::new().with_observer(sink.clone()), json!(3))
        .await;
    drain().await;

    let records = sink.snapshot();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.run_id == ctx.run_id));
    assert!(records.iter().all(|r| r.status == NodeStatus::Done));

    let d = records.iter().find(|r| r.node.as_str() == "d").unwrap();
    assert_eq!(d.input, json!({"b": 4, "c": 2}));
    assert_eq!(d.ret, json!(8));
}

#[tokio::test]
async fn record_timings_are_coherent() {
    let sink = MemorySink::new();
    let flow = GraphBuilder::new()
        .add_node("a", EchoNode)
        .add_node(
            "b",
            SlowAddNode::new("a", 1, Duration::from_millis(120)),
        )
        .add_edge("a", "b")
        .with_start("a")
        .with_end("b")
        .compile()
        .unwrap();

    flow.run_with(RunOptions::new().with_observer(sink.clone()), json!(1))
        .await;
    drain().await;

    for record in sink.snapshot() {
        assert!(record.waiting_ms >= 0);
        assert!(record.elapsed_execution_ms >= 0);
        assert!(record.elapsed_total_ms >= record.elapsed_execution_ms);
        assert!(record.end_execution >= record.start_execution);
    }
    let b = sink
        .snapshot()
        .into_iter()
        .find(|r| r.node.as_str() == "b")
        .unwrap();
    assert!(b.elapsed_execution_ms >= 110);
}

#[tokio::test]
async fn dangling_node_record_is_still_emitted() {
    let (dangling, _flag) = FlagNode::new(Duration::from_millis(100));
    let sink = MemorySink::new();

    let flow = GraphBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", AddNode::new("a", 1))
        .add_node("dangling", dangling)
        .add_edge("a", "b")
        .add_edge("a", "dangling")
        .with_start("a")
        .with_end("b")
        .compile()
        .unwrap();

    flow.run_with(RunOptions::new().with_observer(sink.clone()), json!(1))
        .await;

    // The run resolved; the dangling branch is still asleep.
    let nodes_now: Vec<String> = sink
        .snapshot()
        .iter()
        .map(|r| r.node.to_string())
        .collect();
    assert!(!nodes_now.contains(&"dangling".to_string()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    let nodes_later: Vec<String> = sink
        .snapshot()
        .iter()
        .map(|r| r.node.to_string())
        .collect();
    assert!(nodes_later.contains(&"dangling".to_string()));
}

struct FailingSink;

impl ObserverSink for FailingSink {
    fn handle(&self, _record: &NodeRecord) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "sink always fails"))
    }
}

#[tokio::test]
async fn observer_failures_are_swallowed() {
    let flow = diamond();
    let (ctx, result) = flow
        .run_with(RunOptions::new().with_observer(FailingSink), json!(3))
        .await;
    assert_eq!(result, json!(8));
    assert!(!ctx.is_aborted());
}

#[tokio::test]
async fn skipped_nodes_report_null_returns() {
    let sink = MemorySink::new();
    let flow = GraphBuilder::new()
        .add_node("a", FailingNode::new("boom"))
        .add_node("b", EchoNode)
        .add_edge("a", "b")
        .with_start("a")
        .with_end("b")
        .compile()
        .unwrap();

    flow.run_with(RunOptions::new().with_observer(sink.clone()), json!(1))
        .await;
    drain().await;

    let records = sink.snapshot();
    let a = records.iter().find(|r| r.node.as_str() == "a").unwrap();
    let b = records.iter().find(|r| r.node.as_str() == "b").unwrap();
    assert_eq!(a.status, NodeStatus::Failed);
    assert_eq!(a.ret["message"], json!("boom"));
    assert_eq!(b.status, NodeStatus::Skipped);
    assert_eq!(b.ret, serde_json::Value::Null);
}
