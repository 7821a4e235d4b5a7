#![allow(dead_code)]

use dagflow::flow::Flow;
use dagflow::graphs::GraphBuilder;

use super::nodes::{AddNode, EchoNode, MulNode};

/// The canonical diamond: a -> {b, c} -> d.
///
/// `a` echoes the payload, `b` adds one, `c` subtracts one, `d` multiplies
/// the two. Payload 3 yields (3+1) * (3-1) = 8.
pub fn diamond() -> Flow {
    GraphBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", AddNode::new("a", 1))
        .add_node("c", AddNode::new("a", -1))
        .add_node("d", MulNode::new("b", "c"))
        .add_edge("a", "b")
        .add_edge("a", "c")
        .add_edge("b", "d")
        .add_edge("c", "d")
        .with_start("a")
        .with_end("d")
        .compile()
        .expect("diamond fixture compiles")
}
