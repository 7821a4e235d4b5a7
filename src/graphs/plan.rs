//! Topological planner: orders nodes and attaches their inbound edges.
//!
//! The planner converts a graph into the ordered sequence of
//! `(node, inbound edges)` pairs the run assembler wires up. The order is
//! a valid topological order of the DAG; ties are broken deterministically
//! by node id so a given graph always yields the same plan.
//!
//! Full graph validation is the caller's responsibility, but the planner
//! performs the cheap structural checks that would otherwise make a run
//! hang or loop: unknown edge endpoints, inbound edges on the start node,
//! orphaned nodes, an unreachable end node, and cycles.

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use thiserror::Error;

use super::edges::Edge;
use crate::types::NodeId;

/// Structural failure detected before any node runs.
///
/// None of these are recoverable; the graph must be corrected and
/// recompiled.
#[derive(Debug, Error, Diagnostic)]
pub enum PlanError {
    /// No start node was designated on the builder.
    #[error("no start node was designated")]
    #[diagnostic(
        code(dagflow::plan::missing_start),
        help("Call GraphBuilder::with_start before compiling.")
    )]
    MissingStart,

    /// No end node was designated on the builder.
    #[error("no end node was designated")]
    #[diagnostic(
        code(dagflow::plan::missing_end),
        help("Call GraphBuilder::with_end before compiling.")
    )]
    MissingEnd,

    /// An edge or endpoint designation names a node that was never added.
    #[error("unknown node referenced: {node}")]
    #[diagnostic(
        code(dagflow::plan::unknown_node),
        help("Every node named by an edge or as start/end must be registered with add_node.")
    )]
    UnknownNode { node: NodeId },

    /// The start node has inbound edges.
    #[error("start node {node} has inbound edges")]
    #[diagnostic(
        code(dagflow::plan::start_has_inbound),
        help("The start node is the seed of the dataflow; route such edges to a successor instead.")
    )]
    StartHasInbound { node: NodeId },

    /// A non-start node has no inbound edges and could never fire.
    #[error("node {node} has no inbound edges and is not the start node")]
    #[diagnostic(
        code(dagflow::plan::orphan),
        help("Connect the node to the dataflow or remove it from the graph.")
    )]
    Orphan { node: NodeId },

    /// The end node cannot be reached from the start node.
    #[error("end node {node} is not reachable from the start node")]
    #[diagnostic(code(dagflow::plan::end_unreachable))]
    EndUnreachable { node: NodeId },

    /// The edge set contains a cycle.
    #[error("graph contains a cycle involving: {nodes:?}")]
    #[diagnostic(
        code(dagflow::plan::cycle),
        help("The executor only accepts directed acyclic graphs.")
    )]
    Cycle { nodes: Vec<NodeId> },
}

/// One entry of the plan: a node plus the edges feeding it.
///
/// The start node's `inbound` is always empty; it receives the initial
/// payload instead.
#[derive(Clone, Debug)]
pub struct PlannedNode {
    /// The node to run.
    pub id: NodeId,
    /// The inbound edges whose messages must all arrive before the node
    /// may execute.
    pub inbound: Vec<Edge>,
}

/// Order the graph topologically and attach inbound edges per node.
///
/// Duplicate edges between the same ordered pair are collapsed to the
/// first occurrence (first-wins, including its options). The returned
/// sequence starts with the start node; ties are broken by lexical node
/// id, so the plan is deterministic for a given graph.
pub(crate) fn plan(
    node_ids: &FxHashSet<NodeId>,
    edges: &[Edge],
    start: &NodeId,
    end: &NodeId,
) -> Result<Vec<PlannedNode>, PlanError> {
    for endpoint in [start, end] {
        if !node_ids.contains(endpoint) {
            return Err(PlanError::UnknownNode {
                node: endpoint.clone(),
            });
        }
    }
    for edge in edges {
        for endpoint in [&edge.from, &edge.to] {
            if !node_ids.contains(endpoint) {
                return Err(PlanError::UnknownNode {
                    node: endpoint.clone(),
                });
            }
        }
    }

    let edges = dedup_edges(edges);

    let mut inbound: FxHashMap<&NodeId, Vec<&Edge>> = FxHashMap::default();
    let mut successors: FxHashMap<&NodeId, Vec<&NodeId>> = FxHashMap::default();
    for edge in &edges {
        inbound.entry(&edge.to).or_default().push(edge);
        successors.entry(&edge.from).or_default().push(&edge.to);
    }

    if inbound.contains_key(start) {
        return Err(PlanError::StartHasInbound {
            node: start.clone(),
        });
    }
    for id in node_ids {
        if id != start && !inbound.contains_key(id) {
            return Err(PlanError::Orphan { node: id.clone() });
        }
    }
    if !reaches(&successors, start, end) {
        return Err(PlanError::EndUnreachable { node: end.clone() });
    }

    // Kahn's algorithm with a sorted ready set for determinism.
    let mut indegree: FxHashMap<&NodeId, usize> = FxHashMap::default();
    for id in node_ids {
        indegree.insert(id, inbound.get(id).map_or(0, Vec::len));
    }
    let mut ready: BTreeSet<&NodeId> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut ordered = Vec::with_capacity(node_ids.len());
    while let Some(id) = ready.pop_first() {
        ordered.push(PlannedNode {
            id: id.clone(),
            inbound: inbound
                .get(id)
                .map(|edges| edges.iter().map(|e| (*e).clone()).collect())
                .unwrap_or_default(),
        });
        for next in successors.get(id).into_iter().flatten() {
            let degree = indegree
                .get_mut(*next)
                .expect("successor indegree tracked for every node");
            *degree -= 1;
            if *degree == 0 {
                ready.insert(*next);
            }
        }
    }

    if ordered.len() < node_ids.len() {
        let mut stuck: Vec<NodeId> = indegree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id.clone())
            .collect();
        stuck.sort();
        return Err(PlanError::Cycle { nodes: stuck });
    }

    tracing::debug!(nodes = ordered.len(), "graph planned");
    Ok(ordered)
}

/// Collapse duplicate `(from, to)` pairs, keeping the first occurrence.
fn dedup_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut seen: FxHashSet<(&NodeId, &NodeId)> = FxHashSet::default();
    let mut kept = Vec::with_capacity(edges.len());
    for edge in edges {
        if seen.insert((&edge.from, &edge.to)) {
            kept.push(edge.clone());
        }
    }
    kept
}

fn reaches(
    successors: &FxHashMap<&NodeId, Vec<&NodeId>>,
    start: &NodeId,
    target: &NodeId,
) -> bool {
    let mut visited: FxHashSet<&NodeId> = FxHashSet::default();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if visited.insert(id) {
            if let Some(next) = successors.get(id) {
                stack.extend(next.iter().copied());
            }
        }
    }
    false
}
