//! Observer sinks: pluggable consumers of node execution records.

use std::io::{self, Result as IoResult, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::record::NodeRecord;

/// Abstraction over an output target that consumes node execution records.
///
/// Sinks are side-effectful black boxes to the engine: they run on a
/// detached dispatch task, their errors are swallowed, and they can never
/// back-pressure the dataflow.
pub trait ObserverSink: Send + Sync {
    /// Handle one record. The sink decides how to serialize or store it.
    fn handle(&self, record: &NodeRecord) -> IoResult<()>;
}

/// Stdout sink emitting one JSON line per record.
#[derive(Default)]
pub struct StdOutSink;

impl ObserverSink for StdOutSink {
    fn handle(&self, record: &NodeRecord) -> IoResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut handle = io::stdout().lock();
        handle.write_all(line.as_bytes())?;
        handle.flush()
    }
}

/// In-memory sink for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<NodeRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured records.
    pub fn snapshot(&self) -> Vec<NodeRecord> {
        self.entries.lock().unwrap().clone()
    }

    /// Clear all captured records.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl ObserverSink for MemorySink {
    fn handle(&self, record: &NodeRecord) -> IoResult<()> {
        self.entries.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Channel-based sink for streaming records to async consumers.
///
/// Records are forwarded to a tokio mpsc channel without blocking. Useful
/// for live dashboards or test assertions that want to await records.
///
/// # Example
/// ```no_run
/// use tokio::sync::mpsc;
/// use dagflow::observers::ChannelSink;
///
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let sink = ChannelSink::new(tx);
///
/// tokio::spawn(async move {
///     while let Some(record) = rx.recv().await {
///         println!("{} settled as {}", record.node, record.status);
///     }
/// });
/// ```
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<NodeRecord>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<NodeRecord>) -> Self {
        Self { tx }
    }
}

impl ObserverSink for ChannelSink {
    fn handle(&self, record: &NodeRecord) -> IoResult<()> {
        self.tx
            .send(record.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel receiver dropped"))
    }
}
