//! Graph definition, planning, and compilation.
//!
//! This module provides the graph-building surface of the crate. The main
//! entry point is [`GraphBuilder`], which uses a builder pattern to declare
//! nodes, edges (optionally shaped), and the start/end designations, then
//! compiles into an executable [`Flow`](crate::flow::Flow).
//!
//! # Core Concepts
//!
//! - **Nodes**: units of work implementing the [`Node`](crate::node::Node) trait
//! - **Edges**: dependency arrows; each may rename, transform, or filter the
//!   producer's contribution to the consumer's input mapping
//! - **Planning**: a deterministic topological order with per-node inbound
//!   edges, computed once at compile time
//! - **Structural validation**: cycles, orphans, unknown endpoints, and
//!   unreachable end nodes are rejected before anything runs
//!
//! # Quick Start
//!
//! ```rust
//! use dagflow::graphs::{EdgeOptions, GraphBuilder};
//! use dagflow::node::FnNode;
//! use serde_json::json;
//!
//! // a -> b with the contribution renamed to "n1" and doubled.
//! let flow = GraphBuilder::new()
//!     .add_node("a", FnNode::infallible(|v| v))
//!     .add_node("b", FnNode::infallible(|v| json!(v["n1"].as_i64().unwrap_or(0))))
//!     .add_edge_with(
//!         "a",
//!         "b",
//!         EdgeOptions::new()
//!             .with_name("n1")
//!             .with_transform(|v| json!(v.as_i64().unwrap_or(0) * 2)),
//!     )
//!     .with_start("a")
//!     .with_end("b")
//!     .compile()
//!     .unwrap();
//! ```

mod builder;
mod compilation;
mod edges;
mod plan;

pub use builder::GraphBuilder;
pub use edges::{Edge, EdgeOptions, Filter, Transform};
pub use plan::{PlanError, PlannedNode};
