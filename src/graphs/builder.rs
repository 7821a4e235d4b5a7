//! GraphBuilder implementation for constructing executable dataflow graphs.
//!
//! This module contains the main GraphBuilder type and its fluent API
//! for declaring nodes, edges, and the start/end designations before
//! compiling into a [`Flow`](crate::flow::Flow).

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::edges::{Edge, EdgeOptions};
use crate::node::Node;
use crate::types::NodeId;

/// Builder for constructing dataflow graphs with a fluent API.
///
/// `GraphBuilder` collects nodes, edges, and the start/end designations,
/// then validates and converts the graph into an executable
/// [`Flow`](crate::flow::Flow) via [`compile`](Self::compile).
///
/// # Required Configuration
///
/// Every graph must have:
/// - every node referenced by an edge registered via [`add_node`](Self::add_node)
/// - a start node designated via [`with_start`](Self::with_start) (no inbound edges)
/// - an end node designated via [`with_end`](Self::with_end) (the run's single
///   return point; other terminal nodes may exist and simply dangle)
///
/// # Examples
///
/// ```rust
/// use dagflow::graphs::{EdgeOptions, GraphBuilder};
/// use dagflow::node::FnNode;
/// use serde_json::json;
///
/// let flow = GraphBuilder::new()
///     .add_node("a", FnNode::infallible(|v| v))
///     .add_node("b", FnNode::infallible(|v| json!(v["a"].as_i64().unwrap_or(0) + 1)))
///     .add_edge("a", "b")
///     .with_start("a")
///     .with_end("b")
///     .compile()
///     .expect("valid graph");
/// ```
pub struct GraphBuilder {
    /// Registry of all nodes in the graph, keyed by their identifier.
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    /// Dependency arrows in declaration order.
    edges: Vec<Edge>,
    /// The node seeded with the initial payload.
    start: Option<NodeId>,
    /// The node whose output is the run result.
    end: Option<NodeId>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new, empty graph builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            edges: Vec::new(),
            start: None,
            end: None,
        }
    }

    /// Adds a node to the graph.
    ///
    /// Registers a node implementation under the given identifier. Each
    /// node must have a unique [`NodeId`] within the graph; registering the
    /// same identifier twice replaces the earlier implementation and emits
    /// a warning.
    #[must_use]
    pub fn add_node(mut self, id: impl Into<NodeId>, node: impl Node + 'static) -> Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), Arc::new(node)).is_some() {
            tracing::warn!(%id, "node registered twice; the later registration wins");
        }
        self
    }

    /// Adds an unshaped dependency edge between two nodes.
    ///
    /// The producer's output appears in the consumer's input mapping under
    /// the producer's identifier. Duplicate `(from, to)` pairs are allowed
    /// but collapsed at plan time; the first occurrence's options win.
    #[must_use]
    pub fn add_edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges.push(Edge::new(from, to));
        self
    }

    /// Adds a dependency edge with shaping options.
    ///
    /// See [`EdgeOptions`] for the rename / transform / filter semantics.
    #[must_use]
    pub fn add_edge_with(
        mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        options: EdgeOptions,
    ) -> Self {
        self.edges.push(Edge::with_options(from, to, options));
        self
    }

    /// Designates the start node: the node seeded with the initial payload.
    #[must_use]
    pub fn with_start(mut self, id: impl Into<NodeId>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Designates the end node: the node whose output is the run result.
    #[must_use]
    pub fn with_end(mut self, id: impl Into<NodeId>) -> Self {
        self.end = Some(id.into());
        self
    }

    /// Extracts the components for compilation (internal use only).
    pub(super) fn into_parts(
        self,
    ) -> (
        FxHashMap<NodeId, Arc<dyn Node>>,
        Vec<Edge>,
        Option<NodeId>,
        Option<NodeId>,
    ) {
        (self.nodes, self.edges, self.start, self.end)
    }
}
