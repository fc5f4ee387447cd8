//! Replays each process's deliveries against the recorded dependency snapshots.

use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;

use lcb_proto::{Event, MessageId, ProcessId};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::dependency::DependencySnapshots;
use crate::error::VerifyError;
use crate::loader::{Trace, TraceSet};

/// A delivery made before one of its recorded dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The process that delivered out of order.
    pub process: ProcessId,
    pub message: MessageId,
    /// A dependency of `message` that `process` had not yet delivered.
    pub missing: MessageId,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "p{} delivers {} before {}", self.process, self.message, self.missing) }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckMode {
    /// Stop at the first violation.
    #[default]
    FirstViolation,
    /// Report every violation, in scan order. Malformed references still stop the scan.
    CollectAll,
}

/// Deliveries made so far by one process, in order, with a set index for lookups.
#[derive(Debug, Default)]
pub struct DeliveryHistory {
    order: Vec<MessageId>,
    index: HashSet<MessageId>,
}

impl DeliveryHistory {
    pub fn push(&mut self, message: MessageId) {
        self.order.push(message);
        self.index.insert(message);
    }

    pub fn contains(&self, message: &MessageId) -> bool { self.index.contains(message) }

    pub fn as_slice(&self) -> &[MessageId] { &self.order }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

pub struct OrderChecker<'a> {
    snapshots: &'a DependencySnapshots,
    mode: CheckMode,
}

impl<'a> OrderChecker<'a> {
    pub fn new(snapshots: &'a DependencySnapshots) -> Self { Self { snapshots, mode: CheckMode::default() } }

    pub fn with_mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check every trace in process order. An empty result means no violation was found.
    #[instrument(skip_all, fields(mode = ?self.mode))]
    pub fn check(&self, traces: &TraceSet) -> Result<Vec<Violation>, VerifyError> {
        let mut violations = Vec::new();
        for trace in &traces.traces {
            if self.check_trace(trace, &mut violations)?.is_break() {
                break;
            }
        }
        Ok(violations)
    }

    /// Replay one trace. Breaks once a violation is found in [`CheckMode::FirstViolation`].
    pub fn check_trace(&self, trace: &Trace, violations: &mut Vec<Violation>) -> Result<ControlFlow<()>, VerifyError> {
        let process = trace.process;
        let mut delivered = DeliveryHistory::default();

        for event in &trace.events {
            let Event::Deliver { message } = event else { continue };
            let dependencies = self.snapshots.get(message).ok_or_else(|| VerifyError::UnknownMessage { process, message: *message })?;

            for missing in dependencies.iter().filter(|dep| !delivered.contains(dep)) {
                let violation = Violation { process, message: *message, missing: *missing };
                debug!("violation: {}", violation);
                violations.push(violation);
                if self.mode == CheckMode::FirstViolation {
                    return Ok(ControlFlow::Break(()));
                }
            }
            trace!("{:?} delivers {} with {} dependencies satisfied", process, message, dependencies.len());
            delivered.push(*message);
        }

        debug!("{:?}: checked {} deliveries", process, delivered.len());
        Ok(ControlFlow::Continue(()))
    }
}
