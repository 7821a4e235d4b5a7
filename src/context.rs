//! Run context and captured-failure types threaded through every message.
//!
//! A [`RunContext`] is created once per run, cloned into every
//! [`Envelope`](crate::message::Envelope), and enriched as the run
//! progresses: the source node stamps the execution start, a failing node
//! stamps the abort signal, and the run assembler finalizes the derived
//! timing fields when the end node's message arrives.
//!
//! Abortion is deliberately carried as data on the context instead of a
//! thrown failure inside the dataflow; only
//! [`Flow::run_sync`](crate::flow::Flow::run_sync) converts it back into an
//! error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::NodeError;
use crate::types::{Control, NodeId};
use crate::utils::run_id::generate_run_id;

/// A node failure captured as a plain value.
///
/// When a user function raises, the failure is lowered into this
/// serializable form so it can ride along the dataflow inside run contexts
/// and observer records without borrowing from the original error.
///
/// # Examples
///
/// ```rust
/// use dagflow::context::FailureInfo;
///
/// let failure = FailureInfo::new("parse", "unexpected token");
/// assert_eq!(failure.message, "unexpected token");
/// assert_eq!(failure.node.as_str(), "parse");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureInfo {
    /// The node whose user function raised.
    pub node: NodeId,
    /// Human-readable failure message.
    pub message: String,
    /// Optional structured detail attached to the failure.
    #[serde(default)]
    pub details: Value,
}

impl FailureInfo {
    /// Capture a failure with a bare message.
    pub fn new(node: impl Into<NodeId>, message: impl Into<String>) -> Self {
        FailureInfo {
            node: node.into(),
            message: message.into(),
            details: Value::Null,
        }
    }

    /// Capture a [`NodeError`] raised by the given node's user function.
    pub fn from_node_error(node: &NodeId, error: &NodeError) -> Self {
        FailureInfo {
            node: node.clone(),
            message: error.to_string(),
            details: Value::Null,
        }
    }

    /// Attach structured details to this failure.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

impl std::fmt::Display for FailureInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FailureInfo {}

/// Per-run metadata threaded through every message of one run.
///
/// Wall-clock timestamps are recorded at three points: when the run was
/// requested, when the start node began executing, and when the end node's
/// message reached the assembler. The `*_ms` fields are derived from those
/// three by [`finalize`](Self::finalize).
///
/// # Examples
///
/// ```rust
/// use dagflow::context::RunContext;
///
/// let ctx = RunContext::new();
/// assert_eq!(ctx.run_id.len(), 21);
/// assert!(!ctx.is_aborted());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Short opaque identifier, unique per run.
    pub run_id: String,
    /// When the run was requested.
    pub start_request: DateTime<Utc>,
    /// When the start node began executing its user function.
    pub start_execution: Option<DateTime<Utc>>,
    /// When the end node's message reached the assembler.
    pub end_execution: Option<DateTime<Utc>>,
    /// Planning and channel-wiring overhead before the first user function.
    pub graph_overhead_ms: Option<i64>,
    /// Time spent between the first user function and the end result.
    pub elapsed_execution_ms: Option<i64>,
    /// Total wall-clock time of the run.
    pub elapsed_total_ms: Option<i64>,
    /// In-band control signal; `Some(Abort)` once any node has failed.
    pub control: Option<Control>,
    /// The failure responsible for an abort, if any.
    pub ex: Option<FailureInfo>,
}

impl RunContext {
    /// Create a fresh context with a generated run id and the request
    /// timestamp set to now.
    #[must_use]
    pub fn new() -> Self {
        RunContext {
            run_id: generate_run_id(),
            start_request: Utc::now(),
            start_execution: None,
            end_execution: None,
            graph_overhead_ms: None,
            elapsed_execution_ms: None,
            elapsed_total_ms: None,
            control: None,
            ex: None,
        }
    }

    /// Returns `true` once the abort signal has been set.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.control, Some(Control::Abort))
    }

    /// Stamp the moment the first user function starts executing.
    ///
    /// Called by the source node runtime immediately before invoking its
    /// user function; later nodes leave the stamp untouched.
    pub fn mark_execution_start(&mut self) {
        if self.start_execution.is_none() {
            self.start_execution = Some(Utc::now());
        }
    }

    /// Record a node failure and raise the abort signal.
    ///
    /// The first failure carried along a path wins; a context that is
    /// already aborted keeps its original `ex`.
    pub fn abort(&mut self, failure: FailureInfo) {
        self.control = Some(Control::Abort);
        if self.ex.is_none() {
            self.ex = Some(failure);
        }
    }

    /// Stamp the end of the run and compute the derived timing fields.
    ///
    /// Called exactly once by the run assembler when the end node's message
    /// arrives. If the start node never executed (abort before execution is
    /// impossible in a well-formed run, but defensive), the execution window
    /// collapses to zero.
    pub fn finalize(&mut self) {
        let end = Utc::now();
        self.end_execution = Some(end);
        let start_execution = self.start_execution.unwrap_or(end);
        self.graph_overhead_ms =
            Some((start_execution - self.start_request).num_milliseconds());
        self.elapsed_execution_ms = Some((end - start_execution).num_milliseconds());
        self.elapsed_total_ms = Some((end - self.start_request).num_milliseconds());
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::run_id::RUN_ID_ALPHABET;

    #[test]
    fn fresh_context_shape() {
        let ctx = RunContext::new();
        assert_eq!(ctx.run_id.len(), 21);
        assert!(ctx
            .run_id
            .bytes()
            .all(|b| RUN_ID_ALPHABET.contains(&b)));
        assert!(ctx.start_execution.is_none());
        assert!(ctx.ex.is_none());
    }

    #[test]
    fn abort_is_monotonic_and_keeps_first_failure() {
        let mut ctx = RunContext::new();
        ctx.abort(FailureInfo::new("a", "first"));
        ctx.abort(FailureInfo::new("b", "second"));
        assert!(ctx.is_aborted());
        assert_eq!(ctx.ex.as_ref().unwrap().message, "first");
    }

    #[test]
    fn finalize_derives_consistent_timings() {
        let mut ctx = RunContext::new();
        ctx.mark_execution_start();
        ctx.finalize();
        let overhead = ctx.graph_overhead_ms.unwrap();
        let execution = ctx.elapsed_execution_ms.unwrap();
        let total = ctx.elapsed_total_ms.unwrap();
        assert!(overhead >= 0);
        assert!(execution >= 0);
        assert!(total >= overhead + execution - 1);
        assert!(total <= overhead + execution + 1);
    }

    #[test]
    fn execution_start_is_stamped_once() {
        let mut ctx = RunContext::new();
        ctx.mark_execution_start();
        let first = ctx.start_execution;
        ctx.mark_execution_start();
        assert_eq!(ctx.start_execution, first);
    }
}
