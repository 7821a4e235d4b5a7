//! Core identifier and status types for the dagflow execution engine.
//!
//! This module defines the fundamental vocabulary used throughout the crate:
//! node identity, per-node outcome classification, and the in-band control
//! signal carried by run contexts.
//!
//! # Key Types
//!
//! - [`NodeId`]: Opaque, comparable identifier for a node in a graph
//! - [`NodeStatus`]: Outcome classification of one node execution
//! - [`Control`]: In-band control signal threaded through run contexts
//!
//! # Examples
//!
//! ```rust
//! use dagflow::types::{NodeId, NodeStatus};
//!
//! let id: NodeId = "fetch".into();
//! assert_eq!(id.as_str(), "fetch");
//! assert_eq!(NodeStatus::Skipped.to_string(), "skipped");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a node within a graph.
///
/// Callers pick the identifiers; the engine only requires that they are
/// comparable and hashable. The identifier doubles as the default key under
/// which a producer's value appears in a consumer's input mapping (see
/// [`EdgeOptions`](crate::graphs::EdgeOptions) for overriding it).
///
/// # Examples
///
/// ```rust
/// use dagflow::types::NodeId;
///
/// let a = NodeId::new("a");
/// let b: NodeId = "b".into();
/// assert!(a < b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node identifier from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Developer Experience: allow using string literals where a NodeId is expected.
impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// Outcome classification of a single node execution within one run.
///
/// Every node settles into exactly one of these states per run and reports
/// it through its [`NodeRecord`](crate::observers::NodeRecord).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// The user function ran and returned a value.
    Done,
    /// The user function ran and raised a failure.
    Failed,
    /// An upstream abort was observed; the user function was never invoked.
    Skipped,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// In-band control signal carried by a [`RunContext`](crate::context::RunContext).
///
/// Abortion is represented as data on the context rather than as a thrown
/// failure inside the dataflow; only the synchronous entry point converts it
/// back into an error. Once set, the signal is preserved through every
/// downstream merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    /// A node failed; all transitively-downstream nodes must skip.
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_roundtrip_and_ordering() {
        let a = NodeId::new("a");
        let also_a: NodeId = "a".into();
        assert_eq!(a, also_a);
        assert!(a < NodeId::new("b"));
        assert_eq!(a.to_string(), "a");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&NodeStatus::Skipped).unwrap(),
            "\"skipped\""
        );
        assert_eq!(NodeStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn control_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Control::Abort).unwrap(), "\"abort\"");
    }
}
