//! Dependency snapshots: for every broadcast, the causally relevant deliveries
//! its broadcaster had already made.
//!
//! Each process's trace is replayed in file order while accumulating the
//! deliveries relevant to it (its own messages and those of its affected set).
//! At every `Broadcast` the accumulator is copied into the snapshot for that
//! message. The accumulator only ever grows.

use std::collections::HashMap;

use lcb_proto::{Event, Membership, MessageId, ProcessId, Seq};
use tracing::{debug, instrument, trace};

use crate::error::VerifyError;
use crate::loader::{Trace, TraceSet};

/// Write-once map from broadcast message to its recorded dependencies.
///
/// Only [`DependencyBuilder`] inserts; readers get shared access.
#[derive(Debug, Clone, Default)]
pub struct DependencySnapshots {
    snapshots: HashMap<MessageId, Vec<MessageId>>,
    /// Broadcast sequence numbers per process, in trace order.
    broadcasts: HashMap<ProcessId, Vec<Seq>>,
}

impl DependencySnapshots {
    pub fn get(&self, message: &MessageId) -> Option<&[MessageId]> { self.snapshots.get(message).map(Vec::as_slice) }

    pub fn len(&self) -> usize { self.snapshots.len() }

    pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }

    /// The snapshots taken at each of `process`'s broadcasts, in the order it broadcast.
    pub fn snapshots_of(&self, process: ProcessId) -> Vec<(Seq, &[MessageId])> {
        let Some(seqs) = self.broadcasts.get(&process) else { return Vec::new() };
        seqs.iter().filter_map(|seq| self.get(&MessageId::new(process, *seq)).map(|deps| (*seq, deps))).collect()
    }

    fn insert(&mut self, message: MessageId, dependencies: Vec<MessageId>) -> Result<(), VerifyError> {
        if self.snapshots.contains_key(&message) {
            return Err(VerifyError::DuplicateBroadcast { process: message.broadcaster, seq: message.seq });
        }
        self.snapshots.insert(message, dependencies);
        self.broadcasts.entry(message.broadcaster).or_default().push(message.seq);
        Ok(())
    }
}

pub struct DependencyBuilder<'a> {
    membership: &'a Membership,
    snapshots: DependencySnapshots,
}

impl<'a> DependencyBuilder<'a> {
    pub fn new(membership: &'a Membership) -> Self { Self { membership, snapshots: DependencySnapshots::default() } }

    /// Replay one process's trace, recording a snapshot at each of its broadcasts.
    pub fn scan(&mut self, trace: &Trace) -> Result<(), VerifyError> {
        let process = trace.process;
        let mut relevant: Vec<MessageId> = Vec::new();

        for event in &trace.events {
            match event {
                Event::Deliver { message } => {
                    if self.membership.is_relevant(process, message.broadcaster) {
                        relevant.push(*message);
                    }
                }
                Event::Broadcast { .. } => {
                    let message = event.message(process);
                    trace!("{:?} broadcasts {} after {} relevant deliveries", process, message.seq, relevant.len());
                    self.snapshots.insert(message, relevant.clone())?;
                }
            }
        }

        debug!("{:?}: {} relevant deliveries, {} broadcasts", process, relevant.len(), trace.broadcasts());
        Ok(())
    }

    pub fn finish(self) -> DependencySnapshots { self.snapshots }
}

/// Build the snapshots for every broadcast in the trace set.
#[instrument(skip_all, fields(processes = traces.traces.len()))]
pub fn build(traces: &TraceSet) -> Result<DependencySnapshots, VerifyError> {
    let mut builder = DependencyBuilder::new(&traces.membership);
    for trace in &traces.traces {
        builder.scan(trace)?;
    }
    let snapshots = builder.finish();
    debug!("recorded {} dependency snapshots", snapshots.len());
    Ok(snapshots)
}
