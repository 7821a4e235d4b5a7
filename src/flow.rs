//! The compiled flow and its public entry points.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

use crate::context::FailureInfo;
use crate::graphs::PlannedNode;
use crate::node::Node;
use crate::runtimes::{FlowRunner, RunError, RunHandle, RunOptions};
use crate::types::NodeId;

/// A compiled, executable dataflow graph.
///
/// A `Flow` is produced by
/// [`GraphBuilder::compile`](crate::graphs::GraphBuilder::compile) and can
/// be run any number of times, concurrently if desired: each run builds its
/// own disposable channel topology and task set. The flow itself is cheap
/// to clone and immutable.
///
/// # Examples
///
/// ```rust,no_run
/// use dagflow::graphs::GraphBuilder;
/// use dagflow::node::FnNode;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let flow = GraphBuilder::new()
///     .add_node("a", FnNode::infallible(|v| v))
///     .add_node("b", FnNode::infallible(|v| json!(v["a"].as_i64().unwrap_or(0) + 1)))
///     .add_edge("a", "b")
///     .with_start("a")
///     .with_end("b")
///     .compile()?;
///
/// let (ctx, result) = flow.run(json!(3)).await;
/// assert_eq!(result, json!(4));
/// assert!(!ctx.is_aborted());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Flow {
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    plan: Arc<Vec<PlannedNode>>,
    start: NodeId,
    end: NodeId,
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl Flow {
    /// Internal (crate) factory keeping the parts private.
    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeId, Arc<dyn Node>>,
        plan: Vec<PlannedNode>,
        start: NodeId,
        end: NodeId,
    ) -> Self {
        Flow {
            nodes,
            plan: Arc::new(plan),
            start,
            end,
        }
    }

    /// The node seeded with the initial payload.
    #[must_use]
    pub fn start(&self) -> &NodeId {
        &self.start
    }

    /// The node whose output is the run result.
    #[must_use]
    pub fn end(&self) -> &NodeId {
        &self.end
    }

    /// The topological plan computed at compile time.
    #[must_use]
    pub fn plan(&self) -> &[PlannedNode] {
        &self.plan
    }

    /// Start a run with default options.
    ///
    /// Must be called from within a tokio runtime; the run is spawned
    /// immediately and the returned [`RunHandle`] resolves to
    /// `(RunContext, Value)`. An aborted run resolves normally with
    /// `control = Abort` set on the context and a `null` result.
    pub fn run(&self, payload: impl Into<Value>) -> RunHandle {
        self.run_with(RunOptions::default(), payload)
    }

    /// Start a run with explicit options.
    pub fn run_with(&self, options: RunOptions, payload: impl Into<Value>) -> RunHandle {
        let runner = self.runner();
        RunHandle::new(tokio::spawn(runner.execute(payload.into(), options.observer)))
    }

    /// Run to completion on a private runtime, blocking the calling thread.
    ///
    /// Returns the bare result, dropping the context. An aborted run is
    /// converted into [`RunError::Aborted`] carrying the original failure.
    /// Dangling branches keep running on the shared blocking runtime after
    /// this returns.
    ///
    /// Must not be called from within an async context; use
    /// [`run`](Self::run) there instead.
    pub fn run_sync(&self, payload: impl Into<Value>) -> Result<Value, RunError> {
        self.run_sync_with(RunOptions::default(), payload)
    }

    /// Blocking form of [`run_with`](Self::run_with).
    pub fn run_sync_with(
        &self,
        options: RunOptions,
        payload: impl Into<Value>,
    ) -> Result<Value, RunError> {
        let runner = self.runner();
        let payload = payload.into();
        let (ctx, result) =
            sync_runtime().block_on(runner.execute(payload, options.observer));
        if ctx.is_aborted() {
            let ex = ctx.ex.unwrap_or_else(|| {
                FailureInfo::new(self.end.clone(), "aborted with no captured failure")
            });
            Err(RunError::Aborted { ex })
        } else {
            Ok(result)
        }
    }

    fn runner(&self) -> FlowRunner {
        FlowRunner::new(
            self.nodes.clone(),
            self.plan.clone(),
            self.start.clone(),
            self.end.clone(),
        )
    }
}

/// Shared runtime backing the blocking entry points.
///
/// Kept alive for the life of the process so dangling branches of a
/// completed synchronous run can still finish and report to observers.
fn sync_runtime() -> &'static tokio::runtime::Runtime {
    static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("blocking runtime must be constructible")
    })
}
