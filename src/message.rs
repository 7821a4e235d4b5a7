//! The single message type carried on every channel of a run.
//!
//! Each channel in the run topology transports exactly one [`Envelope`]
//! and then closes. The envelope pairs a producer identity with the run
//! context as seen by that producer and the produced value, which is what
//! lets consumers shape their input per edge and observe in-band aborts.

use serde_json::Value;

use crate::context::RunContext;
use crate::types::NodeId;

/// One message flowing along an edge of the run topology.
///
/// The seed envelope written by the run assembler carries no producer
/// (`from` is `None`); every node-emitted envelope names its producer so
/// the consumer can look up the matching edge operator.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// The node that produced this message, or `None` for the seed.
    pub from: Option<NodeId>,
    /// The run context as seen by the producer.
    pub ctx: RunContext,
    /// The produced value (the initial payload for the seed).
    pub value: Value,
}

impl Envelope {
    /// The seed message delivering the initial payload to the start node.
    #[must_use]
    pub fn seed(ctx: RunContext, payload: Value) -> Self {
        Envelope {
            from: None,
            ctx,
            value: payload,
        }
    }

    /// A message emitted by a node after it settled.
    #[must_use]
    pub fn emitted(from: NodeId, ctx: RunContext, value: Value) -> Self {
        Envelope {
            from: Some(from),
            ctx,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seed_has_no_producer() {
        let env = Envelope::seed(RunContext::new(), json!(3));
        assert!(env.from.is_none());
        assert_eq!(env.value, json!(3));
    }

    #[test]
    fn emitted_names_its_producer() {
        let env = Envelope::emitted("a".into(), RunContext::new(), json!(1));
        assert_eq!(env.from, Some("a".into()));
    }
}
