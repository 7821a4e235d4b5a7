//! Graph compilation: structural validation and conversion to a [`Flow`].

use rustc_hash::FxHashSet;

use super::plan::{plan, PlanError};
use crate::flow::Flow;
use crate::types::NodeId;

/// Compilation logic for GraphBuilder.
impl super::builder::GraphBuilder {
    /// Compiles the graph into an executable [`Flow`].
    ///
    /// Validation performed here, before any node can run:
    /// - start and end are designated and registered
    /// - every edge endpoint names a registered node
    /// - the start node has no inbound edges
    /// - every other node has at least one inbound edge
    /// - the end node is reachable from the start node
    /// - the edge set is acyclic
    ///
    /// The topological plan computed during validation is retained on the
    /// [`Flow`], so per-run planning cost is zero.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] describing the first structural defect found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dagflow::graphs::GraphBuilder;
    /// use dagflow::node::FnNode;
    ///
    /// let result = GraphBuilder::new()
    ///     .add_node("a", FnNode::infallible(|v| v))
    ///     .with_start("a")
    ///     .with_end("a")
    ///     .compile();
    /// assert!(result.is_ok());
    /// ```
    pub fn compile(self) -> Result<Flow, PlanError> {
        let (nodes, edges, start, end) = self.into_parts();
        let start = start.ok_or(PlanError::MissingStart)?;
        let end = end.ok_or(PlanError::MissingEnd)?;

        let node_ids: FxHashSet<NodeId> = nodes.keys().cloned().collect();
        let planned = plan(&node_ids, &edges, &start, &end)?;

        Ok(Flow::from_parts(nodes, planned, start, end))
    }
}
