//! Detached dispatch of node records to the configured observer sink.

use std::sync::Arc;

use super::record::NodeRecord;
use super::sink::ObserverSink;

/// Publishing side handed to every node task.
///
/// Publishing is non-blocking: records go into an unbounded flume channel
/// drained by a detached listener task. When no observer is configured the
/// handle is disabled and publishing is a no-op. Send failures (listener
/// gone) are ignored; observer behavior must never perturb the run.
#[derive(Clone)]
pub(crate) struct ObserverHandle {
    tx: Option<flume::Sender<NodeRecord>>,
}

impl ObserverHandle {
    /// A handle that drops every record.
    pub(crate) fn disabled() -> Self {
        ObserverHandle { tx: None }
    }

    /// Spawn the dispatch listener for `sink` and return the publishing
    /// handle. The listener exits once every handle clone is dropped.
    pub(crate) fn spawn(sink: Arc<dyn ObserverSink>) -> Self {
        let (tx, rx) = flume::unbounded::<NodeRecord>();
        tokio::spawn(async move {
            while let Ok(record) = rx.recv_async().await {
                if let Err(error) = sink.handle(&record) {
                    tracing::warn!(%error, "observer sink error swallowed");
                }
            }
        });
        ObserverHandle { tx: Some(tx) }
    }

    /// Publish one record. Never blocks, never fails.
    pub(crate) fn publish(&self, record: NodeRecord) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::MemorySink;
    use crate::types::NodeStatus;
    use chrono::Utc;
    use serde_json::Value;

    fn record(node: &str) -> NodeRecord {
        let now = Utc::now();
        NodeRecord {
            run_id: "r".into(),
            node: node.into(),
            start_request: now,
            waiting_ms: 0,
            start_execution: now,
            end_execution: now,
            elapsed_execution_ms: 0,
            elapsed_total_ms: 0,
            input: Value::Null,
            status: NodeStatus::Done,
            ret: Value::Null,
        }
    }

    #[tokio::test]
    async fn disabled_handle_drops_records() {
        let handle = ObserverHandle::disabled();
        handle.publish(record("a"));
    }

    #[tokio::test]
    async fn records_reach_the_sink() {
        let sink = MemorySink::new();
        let handle = ObserverHandle::spawn(Arc::new(sink.clone()));
        handle.publish(record("a"));
        handle.publish(record("b"));
        drop(handle);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let seen: Vec<String> = sink
            .snapshot()
            .iter()
            .map(|r| r.node.to_string())
            .collect();
        assert_eq!(seen, vec!["a", "b"]);
    }
}
