//! Run assembly and per-node task execution.
//!
//! This module is the concurrency core of the crate. For each run it
//! builds a disposable channel topology (one outbound channel per node,
//! one tap per edge, a fan-out per producer), launches one task per node,
//! seeds the start node, and awaits the end node's single message.
//!
//! # Architecture
//!
//! - **[`FlowRunner`](runner) (crate-internal)** - wires channels and
//!   drives one run to its result
//! - **node tasks** - source and dependent task bodies, one tokio task per
//!   node per run
//! - **[`RunHandle`]** - future resolving to `(RunContext, Value)`
//! - **[`RunOptions`]** - per-run configuration (currently: the observer)
//!
//! Entry points live on [`Flow`](crate::flow::Flow); this module supplies
//! the machinery underneath them.

mod execution;
mod runner;

use std::sync::Arc;

use crate::observers::ObserverSink;

pub(crate) use runner::FlowRunner;
pub use runner::{RunError, RunHandle};

/// Per-run options accepted by the entry points.
///
/// Unknown concerns have no representation here by construction; the only
/// recognized option is the observer sink receiving per-node execution
/// records.
///
/// # Examples
///
/// ```rust
/// use dagflow::observers::MemorySink;
/// use dagflow::runtimes::RunOptions;
///
/// let sink = MemorySink::new();
/// let options = RunOptions::new().with_observer(sink.clone());
/// ```
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Sink receiving one record per node execution, or `None` to disable
    /// observation entirely.
    pub observer: Option<Arc<dyn ObserverSink>>,
}

impl RunOptions {
    /// Options with every concern disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer sink to the run.
    #[must_use]
    pub fn with_observer(mut self, sink: impl ObserverSink + 'static) -> Self {
        self.observer = Some(Arc::new(sink));
        self
    }
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("observer", &self.observer.as_ref().map(|_| "<sink>"))
            .finish()
    }
}
