//! Per-node execution records delivered to observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{NodeId, NodeStatus};

/// Everything the engine knows about one node execution within one run.
///
/// Records are published asynchronously after the node has emitted its
/// outbound message, so observer consumption can never delay the dataflow.
/// Delivery order across nodes is unspecified.
///
/// The JSON form uses lowercase status strings and a `return` key for the
/// node's output:
///
/// ```json
/// {
///   "run_id": "V1StGXR8_Z5jdHi6B-myT",
///   "node": "b",
///   "status": "done",
///   "waiting_ms": 3,
///   "elapsed_execution_ms": 502,
///   "input": {"a": 3},
///   "return": 4
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    /// The run this record belongs to.
    pub run_id: String,
    /// The node that settled.
    pub node: NodeId,
    /// When the node's task began waiting for its inputs.
    pub start_request: DateTime<Utc>,
    /// Time spent waiting for inbound messages before execution.
    pub waiting_ms: i64,
    /// When the user function was invoked (or would have been, for skips).
    pub start_execution: DateTime<Utc>,
    /// When the node settled.
    pub end_execution: DateTime<Utc>,
    /// Time spent inside the user function (zero for skips).
    pub elapsed_execution_ms: i64,
    /// Total time from task start to settlement.
    pub elapsed_total_ms: i64,
    /// The input the user function saw (or the partial mapping, for skips).
    pub input: Value,
    /// Outcome classification.
    pub status: NodeStatus,
    /// The node's output: its value when done, the captured failure when
    /// failed, `null` when skipped.
    #[serde(rename = "return")]
    pub ret: Value,
}
