//! ```text
//! GraphBuilder ─┬─► compile ─► Flow ─► run / run_sync
//!               │              │
//!               │              ├─► FlowRunner ─► channels + taps ─► node tasks
//!               │              │                                    │
//!               │              │                                    ├─► edge shaping → input mapping
//!               │              │                                    └─► ObserverBus (NodeRecord)
//!               │              │
//!               │              └─► RunContext (run id, timings, abort)
//!               │
//!               └─► planner (topological order, structural checks)
//! ```
//!
//! Dagflow executes a directed acyclic graph of user functions with maximum
//! permitted parallelism: every node runs in its own task, channels carry
//! exactly one message per edge per run, per-edge options shape each
//! contribution to a consumer's input, and a node failure aborts exactly the
//! downstream part of the graph in-band. See `DESIGN.md` for the execution
//! model and the decisions behind it.

pub mod context;
pub mod flow;
pub mod graphs;
pub mod message;
pub mod node;
pub mod observers;
pub mod runtimes;
pub mod types;
pub mod utils;
