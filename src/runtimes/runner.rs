//! The run assembler: channel wiring and lifecycle of one run.
//!
//! `FlowRunner` owns every channel of a run. The build order matters and is
//! fixed: allocate all outbound channels and taps first, then spawn fan-out
//! and node tasks, and only then write the seed payload. Because every tap
//! exists before any producer can emit, no consumer can miss its message.
//!
//! The assembler suspends exactly once, on the read from the end node's
//! outbound channel. Dangling branches keep running on their own tasks and
//! are never joined.

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::context::{FailureInfo, RunContext};
use crate::graphs::{EdgeOptions, PlannedNode};
use crate::message::Envelope;
use crate::node::Node;
use crate::observers::{ObserverHandle, ObserverSink};
use crate::runtimes::execution::{run_dependent, run_source, NodeTask};
use crate::types::NodeId;

/// Error raised by the synchronous entry point.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    /// A node failed and the abort propagated to the end node.
    #[error("Execution aborted due to exception")]
    #[diagnostic(
        code(dagflow::run::aborted),
        help("The failure raised by the responsible node is carried in `ex`.")
    )]
    Aborted {
        /// The original failure captured from the responsible node.
        ex: FailureInfo,
    },
}

/// Handle to an in-flight run.
///
/// Resolves to `(RunContext, Value)` exactly once. The async entry point
/// never errors on abort; inspect [`RunContext::is_aborted`] (and
/// [`RunContext::ex`](crate::context::RunContext)) on the resolved context
/// instead.
pub struct RunHandle {
    inner: JoinHandle<(RunContext, Value)>,
}

impl RunHandle {
    pub(crate) fn new(inner: JoinHandle<(RunContext, Value)>) -> Self {
        RunHandle { inner }
    }
}

impl Future for RunHandle {
    type Output = (RunContext, Value);

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(Ok(output)) => Poll::Ready(output),
            Poll::Ready(Err(join_error)) => {
                if join_error.is_panic() {
                    std::panic::resume_unwind(join_error.into_panic())
                } else {
                    unreachable!("run task is never cancelled while its handle is alive")
                }
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Assembles and drives one run of a compiled flow.
pub(crate) struct FlowRunner {
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    plan: Arc<Vec<PlannedNode>>,
    start: NodeId,
    end: NodeId,
}

impl FlowRunner {
    pub(crate) fn new(
        nodes: FxHashMap<NodeId, Arc<dyn Node>>,
        plan: Arc<Vec<PlannedNode>>,
        start: NodeId,
        end: NodeId,
    ) -> Self {
        FlowRunner {
            nodes,
            plan,
            start,
            end,
        }
    }

    /// Execute the run to its end-node result.
    #[instrument(name = "flow_run", skip_all)]
    pub(crate) async fn execute(
        self,
        payload: Value,
        observer: Option<Arc<dyn ObserverSink>>,
    ) -> (RunContext, Value) {
        let ctx = RunContext::new();
        tracing::debug!(run_id = %ctx.run_id, nodes = self.plan.len(), "run assembled");

        let observer = match observer {
            Some(sink) => ObserverHandle::spawn(sink),
            None => ObserverHandle::disabled(),
        };

        // 1. Allocate one outbound channel per node.
        let mut outbound_senders: FxHashMap<NodeId, mpsc::Sender<Envelope>> =
            FxHashMap::default();
        let mut outbound_receivers: FxHashMap<NodeId, mpsc::Receiver<Envelope>> =
            FxHashMap::default();
        for planned in self.plan.iter() {
            let (tx, rx) = mpsc::channel(1);
            outbound_senders.insert(planned.id.clone(), tx);
            outbound_receivers.insert(planned.id.clone(), rx);
        }

        // 2. Allocate one tap per inbound edge, before anything can emit.
        let mut taps_by_producer: FxHashMap<NodeId, Vec<mpsc::Sender<Envelope>>> =
            FxHashMap::default();
        let mut taps_by_consumer: FxHashMap<NodeId, Vec<mpsc::Receiver<Envelope>>> =
            FxHashMap::default();
        for planned in self.plan.iter() {
            for edge in &planned.inbound {
                let (tap_tx, tap_rx) = mpsc::channel(1);
                taps_by_producer
                    .entry(edge.from.clone())
                    .or_default()
                    .push(tap_tx);
                taps_by_consumer
                    .entry(planned.id.clone())
                    .or_default()
                    .push(tap_rx);
            }
        }

        let (seed_tx, seed_rx) = mpsc::channel(1);
        let mut seed_rx = Some(seed_rx);

        // 3. The assembler keeps the end node's outbound channel; every
        //    other outbound channel is drained by a fan-out task that
        //    clones the single message into each tap.
        let mut end_rx = outbound_receivers
            .remove(&self.end)
            .expect("end node is always planned");
        for (id, rx) in outbound_receivers {
            let taps = taps_by_producer.remove(&id).unwrap_or_default();
            tokio::spawn(fan_out(rx, taps));
        }
        // Taps fed by nobody (edges out of the end node) close immediately,
        // which downgrades their consumers to skips.
        drop(taps_by_producer);

        // 4. Launch one task per node.
        for planned in self.plan.iter() {
            let task = NodeTask {
                id: planned.id.clone(),
                node: self
                    .nodes
                    .get(&planned.id)
                    .expect("every planned node is registered")
                    .clone(),
                outbound: outbound_senders
                    .remove(&planned.id)
                    .expect("outbound channel allocated per planned node"),
                observer: observer.clone(),
                base_ctx: ctx.clone(),
            };
            if planned.id == self.start {
                let inbound = seed_rx.take().expect("single start node in plan");
                tokio::spawn(run_source(task, inbound));
            } else {
                let taps = taps_by_consumer.remove(&planned.id).unwrap_or_default();
                let shapers: FxHashMap<NodeId, EdgeOptions> = planned
                    .inbound
                    .iter()
                    .map(|edge| (edge.from.clone(), edge.options.clone()))
                    .collect();
                tokio::spawn(run_dependent(task, taps, shapers));
            }
        }
        drop(outbound_senders);

        // 5. Seed the start node.
        if seed_tx
            .send(Envelope::seed(ctx.clone(), payload))
            .await
            .is_err()
        {
            tracing::debug!(run_id = %ctx.run_id, "start node gone before seeding");
        }
        drop(seed_tx);

        // 6. Await the end node's single message; dangling branches keep
        //    running and are never joined.
        match end_rx.recv().await {
            Some(envelope) => {
                let mut ctx = envelope.ctx;
                ctx.finalize();
                (ctx, envelope.value)
            }
            None => {
                // Only reachable when the end task died abnormally.
                let mut ctx = ctx;
                ctx.abort(FailureInfo::new(
                    self.end.clone(),
                    "end node terminated without emitting",
                ));
                ctx.finalize();
                (ctx, Value::Null)
            }
        }
    }
}

/// Broadcast one producer's single message into every tap.
async fn fan_out(mut rx: mpsc::Receiver<Envelope>, taps: Vec<mpsc::Sender<Envelope>>) {
    if let Some(envelope) = rx.recv().await {
        for tap in &taps {
            if tap.send(envelope.clone()).await.is_err() {
                tracing::debug!("tap receiver dropped before broadcast");
            }
        }
    }
}
