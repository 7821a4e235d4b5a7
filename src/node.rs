//! The node abstraction: user-supplied units of computation.
//!
//! A node is one vertex of the graph plus its user function. The engine
//! treats node functions as black boxes: a unary async function from a
//! payload to a value. The start node receives the run's initial payload
//! verbatim; every other node receives a JSON object assembled from its
//! inbound edges (see the input shape guarantee on
//! [`EdgeOptions`](crate::graphs::EdgeOptions)).
//!
//! # Authoring nodes
//!
//! Implement [`Node`] directly when the function needs state or async I/O,
//! or wrap a plain closure with [`FnNode`] for the common case.
//!
//! ```rust
//! use dagflow::node::{FnNode, Node, NodeError};
//! use serde_json::{json, Value};
//!
//! // A closure node: doubles the value produced by node "n1".
//! let double = FnNode::new(|input: Value| {
//!     let n = input["n1"].as_i64().unwrap_or_default();
//!     Ok(json!(n * 2))
//! });
//! ```

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a node's user function.
///
/// A `NodeError` aborts the run: it is captured as a
/// [`FailureInfo`](crate::context::FailureInfo) on the run context and every
/// transitively-downstream node is skipped. Nodes that want to signal a
/// missing-but-tolerable input should instead return a value encoding that
/// fact (e.g. `Value::Null`).
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Expected input data is missing from the input mapping.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(dagflow::node::missing_input),
        help("Check the edge options feeding this node: a rename or filter may have removed the key.")
    )]
    MissingInput { what: &'static str },

    /// External provider or service error.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(dagflow::node::provider))]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(dagflow::node::serde_json))]
    Serde(#[from] serde_json::Error),

    /// Input validation failed.
    #[error("validation failed: {0}")]
    #[diagnostic(code(dagflow::node::validation))]
    ValidationFailed(String),

    /// Free-form failure message.
    #[error("{0}")]
    #[diagnostic(code(dagflow::node::message))]
    Message(String),
}

impl NodeError {
    /// Build a free-form failure from anything string-like.
    pub fn msg(message: impl Into<String>) -> Self {
        NodeError::Message(message.into())
    }
}

/// Core trait for executable graph nodes.
///
/// Implementations must be `Send + Sync`: every node runs in its own
/// concurrent task, exactly once per run. The engine never retries and
/// never invokes a skipped node.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use dagflow::node::{Node, NodeError};
/// use serde_json::{json, Value};
///
/// struct Sum;
///
/// #[async_trait]
/// impl Node for Sum {
///     async fn run(&self, input: Value) -> Result<Value, NodeError> {
///         let total: i64 = input
///             .as_object()
///             .into_iter()
///             .flat_map(|m| m.values())
///             .filter_map(Value::as_i64)
///             .sum();
///         Ok(json!(total))
///     }
/// }
/// ```
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute this node's user function against its assembled input.
    ///
    /// # Returns
    /// * `Ok(Value)` - the node's output, forwarded along its out-edges
    /// * `Err(NodeError)` - a failure; the run context aborts and all
    ///   downstream nodes skip
    async fn run(&self, input: Value) -> Result<Value, NodeError>;
}

/// Adapter turning a plain closure into a [`Node`].
///
/// Covers the common case of a synchronous, pure function. The closure is
/// shared behind an `Arc` so the node (and the graphs holding it) stays
/// cheaply cloneable.
///
/// # Examples
///
/// ```rust
/// use dagflow::node::FnNode;
/// use serde_json::{json, Value};
///
/// // Fallible form:
/// let parse = FnNode::new(|input: Value| {
///     input["raw"]
///         .as_str()
///         .map(|s| json!(s.len()))
///         .ok_or_else(|| dagflow::node::NodeError::msg("raw missing"))
/// });
///
/// // Infallible form:
/// let identity = FnNode::infallible(|input: Value| input);
/// ```
#[derive(Clone)]
pub struct FnNode {
    f: Arc<dyn Fn(Value) -> Result<Value, NodeError> + Send + Sync>,
}

impl FnNode {
    /// Wrap a fallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, NodeError> + Send + Sync + 'static,
    {
        FnNode { f: Arc::new(f) }
    }

    /// Wrap a closure that cannot fail.
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        FnNode {
            f: Arc::new(move |v| Ok(f(v))),
        }
    }
}

impl std::fmt::Debug for FnNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnNode").finish_non_exhaustive()
    }
}

#[async_trait]
impl Node for FnNode {
    async fn run(&self, input: Value) -> Result<Value, NodeError> {
        (self.f)(input)
    }
}
