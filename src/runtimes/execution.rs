//! Node task bodies: the per-node runtimes of one run.
//!
//! Every node executes in its own tokio task, exactly once per run. Two
//! shapes exist: the source task (the start node, seeded by the assembler)
//! and the dependent task (every other node, fed by its inbound taps).
//! Both settle through the same tail: classify the outcome, emit one
//! envelope downstream, then publish the node's execution record.

use chrono::{DateTime, Utc};
use futures_util::stream::select_all;
use futures_util::StreamExt;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::context::{FailureInfo, RunContext};
use crate::graphs::EdgeOptions;
use crate::message::Envelope;
use crate::node::Node;
use crate::observers::{NodeRecord, ObserverHandle};
use crate::types::{NodeId, NodeStatus};

/// Everything one node task needs besides its inbound channel(s).
pub(crate) struct NodeTask {
    pub id: NodeId,
    pub node: Arc<dyn Node>,
    pub outbound: mpsc::Sender<Envelope>,
    pub observer: ObserverHandle,
    /// Fallback context for records when no inbound message ever arrived.
    pub base_ctx: RunContext,
}

/// Source task: runs the start node.
///
/// Awaits the seed envelope, stamps the run-level execution start, then
/// settles. The seed channel closing without a message means the assembler
/// was torn down; the task exits without emitting.
#[tracing::instrument(name = "source_task", skip_all, fields(node = %task.id))]
pub(crate) async fn run_source(task: NodeTask, mut inbound: mpsc::Receiver<Envelope>) {
    let Some(seed) = inbound.recv().await else {
        tracing::debug!(node = %task.id, "seed channel closed before delivery");
        return;
    };
    let start_request = Utc::now();
    settle(task, seed.ctx, seed.value, false, start_request).await;
}

/// Dependent task: runs any node with inbound edges.
///
/// Reduces over the merged inbound taps, shaping each arrival through its
/// edge's operator to build the input mapping. An aborted upstream context
/// marks the node for skipping but the drain always completes, so no
/// producer is ever stranded on a full channel. If the merge ends before
/// every tap delivered (an upstream task died without emitting), the node
/// synthesizes an abort instead of deadlocking.
#[tracing::instrument(name = "dependent_task", skip_all, fields(node = %task.id))]
pub(crate) async fn run_dependent(
    task: NodeTask,
    taps: Vec<mpsc::Receiver<Envelope>>,
    shapers: FxHashMap<NodeId, EdgeOptions>,
) {
    let start_request = Utc::now();
    let expected = taps.len();
    let mut merged = select_all(taps.into_iter().map(ReceiverStream::new));

    let mut input = Map::new();
    let mut latest_ctx: Option<RunContext> = None;
    let mut abort_ex: Option<FailureInfo> = None;
    let mut must_skip = false;
    let mut received = 0usize;

    while let Some(envelope) = merged.next().await {
        received += 1;
        if envelope.ctx.is_aborted() {
            must_skip = true;
            if abort_ex.is_none() {
                abort_ex = envelope.ctx.ex.clone();
            }
            latest_ctx = Some(envelope.ctx);
            // The carried value is a captured failure, not data; never shaped.
            continue;
        }
        latest_ctx = Some(envelope.ctx);
        let Some(from) = envelope.from else {
            continue;
        };
        if let Some(options) = shapers.get(&from) {
            if let Some((key, value)) = options.shape(&from, envelope.value) {
                // Same-key collisions: the later arrival wins.
                input.insert(key, value);
            }
        }
    }

    if received < expected {
        must_skip = true;
        if abort_ex.is_none() {
            abort_ex = Some(FailureInfo::new(
                task.id.clone(),
                "upstream producer terminated without emitting",
            ));
        }
        tracing::warn!(
            node = %task.id,
            received,
            expected,
            "inbound merge ended early; skipping"
        );
    }

    let mut ctx = latest_ctx.unwrap_or_else(|| task.base_ctx.clone());
    if must_skip {
        ctx.abort(abort_ex.unwrap_or_else(|| {
            FailureInfo::new(task.id.clone(), "upstream abort observed")
        }));
    }
    settle(task, ctx, Value::Object(input), must_skip, start_request).await;
}

/// Common settlement tail: classify, emit downstream, publish the record.
async fn settle(
    task: NodeTask,
    mut ctx: RunContext,
    input: Value,
    must_skip: bool,
    start_request: DateTime<Utc>,
) {
    let start_execution = Utc::now();
    let (status, ret) = if must_skip {
        (NodeStatus::Skipped, Value::Null)
    } else {
        ctx.mark_execution_start();
        match task.node.run(input.clone()).await {
            Ok(value) => (NodeStatus::Done, value),
            Err(error) => {
                tracing::debug!(node = %task.id, %error, "node failed; aborting run");
                let failure = FailureInfo::from_node_error(&task.id, &error);
                ctx.abort(failure.clone());
                let ret = serde_json::to_value(&failure).unwrap_or(Value::Null);
                (NodeStatus::Failed, ret)
            }
        }
    };
    let end_execution = Utc::now();

    let envelope = Envelope::emitted(task.id.clone(), ctx.clone(), ret.clone());
    if task.outbound.send(envelope).await.is_err() {
        // Only possible when the run was torn down mid-flight.
        tracing::debug!(node = %task.id, "outbound receiver dropped before emit");
    }
    drop(task.outbound);

    task.observer.publish(NodeRecord {
        run_id: ctx.run_id.clone(),
        node: task.id,
        start_request,
        waiting_ms: (start_execution - start_request).num_milliseconds(),
        start_execution,
        end_execution,
        elapsed_execution_ms: (end_execution - start_execution).num_milliseconds(),
        elapsed_total_ms: (end_execution - start_request).num_milliseconds(),
        input,
        status,
        ret,
    });
}
