mod common;
use common::*;

use dagflow::graphs::GraphBuilder;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread")]
async fn sibling_nodes_run_in_parallel() {
    // b sleeps 500 ms, c sleeps 200 ms. Sequential execution would take
    // ~700 ms; parallel execution finishes in ~max(500, 200).
    let flow = GraphBuilder::new()
        .add_node("a", EchoNode)
        .add_node(
            "b",
            SlowAddNode::new("a", 1, Duration::from_millis(500)),
        )
        .add_node(
            "c",
            SlowAddNode::new("a", -1, Duration::from_millis(200)),
        )
        .add_node("d", MulNode::new("b", "c").with_factor(2))
        .add_edge("a", "b")
        .add_edge("a", "c")
        .add_edge("b", "d")
        .add_edge("c", "d")
        .with_start("a")
        .with_end("d")
        .compile()
        .unwrap();

    let started = Instant::now();
    let (ctx, result) = flow.run(json!(3)).await;
    let elapsed = started.elapsed();

    assert_eq!(result, json!(16)); // 2 * 4 * 2
    assert!(!ctx.is_aborted());
    assert!(
        elapsed >= Duration::from_millis(490),
        "cannot finish before the slowest sibling: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(650),
        "siblings were serialized: {elapsed:?}"
    );
}

#[test]
fn dangling_branch_runs_but_does_not_delay_the_result() {
    let (dangling, flag) = FlagNode::new(Duration::from_millis(200));

    let flow = GraphBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", AddNode::new("a", 1))
        .add_node("d", AddNode::new("b", 0))
        .add_node("dangling", dangling)
        .add_edge("a", "b")
        .add_edge("b", "d")
        .add_edge("b", "dangling")
        .with_start("a")
        .with_end("d")
        .compile()
        .unwrap();

    let started = Instant::now();
    let result = flow.run_sync(json!(6)).unwrap();
    let returned_after = started.elapsed();

    assert_eq!(result, json!(7));
    assert!(
        returned_after < Duration::from_millis(150),
        "dangling branch delayed the result: {returned_after:?}"
    );
    assert!(
        !flag.load(Ordering::SeqCst),
        "run_sync returned after the dangling branch finished"
    );

    // The branch keeps running detached and eventually completes.
    std::thread::sleep(Duration::from_millis(250));
    assert!(flag.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread")]
async fn independent_runs_of_one_flow_do_not_interfere() {
    let flow = diamond();
    let (first, second) = tokio::join!(flow.run(json!(3)), flow.run(json!(4)));
    assert_eq!(first.1, json!(8));
    assert_eq!(second.1, json!(15));
    assert_ne!(first.0.run_id, second.0.run_id);
}
