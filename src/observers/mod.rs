//! Observer dispatch: asynchronous delivery of per-node execution records.
//!
//! When a run is started with an observer (see
//! [`RunOptions`](crate::runtimes::RunOptions)), every node runtime
//! publishes a [`NodeRecord`] after emitting its outbound message. Records
//! travel through an unbounded flume channel to a detached listener task
//! that feeds the configured [`ObserverSink`]; the dataflow is never
//! blocked or delayed by observation, and sink failures are swallowed.
//!
//! # Provided sinks
//!
//! - [`MemorySink`] - capture records in memory (testing, snapshots)
//! - [`StdOutSink`] - one JSON line per record on stdout
//! - [`ChannelSink`] - forward records to a tokio mpsc consumer

mod bus;
mod record;
mod sink;

pub(crate) use bus::ObserverHandle;
pub use record::NodeRecord;
pub use sink::{ChannelSink, MemorySink, ObserverSink, StdOutSink};
