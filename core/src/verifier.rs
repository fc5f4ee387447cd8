//! Ties the phases together: load, build every snapshot, then check every trace.

use tracing::{info, instrument};

use crate::checker::{CheckMode, OrderChecker};
use crate::dependency;
use crate::error::VerifyError;
use crate::loader::{TraceLayout, TraceLoader, TraceSet, UnknownLinePolicy};
use crate::report::{Report, Verdict};

#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    pub layout: TraceLayout,
    pub unknown_lines: UnknownLinePolicy,
    pub mode: CheckMode,
}

pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self { Self { config } }

    /// Read the input files and verify them.
    pub async fn run(&self) -> Result<Report, VerifyError> {
        let loader = TraceLoader::new(self.config.layout.clone()).with_unknown_lines(self.config.unknown_lines);
        let traces = loader.load().await?;
        verify(&traces, self.config.mode)
    }
}

/// Verify an already loaded trace set.
///
/// Every process's snapshots are built before any delivery is checked, since a
/// delivery may refer to a broadcast found in any other process's trace.
#[instrument(skip_all, fields(processes = traces.membership.count()))]
pub fn verify(traces: &TraceSet, mode: CheckMode) -> Result<Report, VerifyError> {
    let broadcasts: usize = traces.traces.iter().map(|t| t.broadcasts()).sum();
    let deliveries: usize = traces.traces.iter().map(|t| t.deliveries()).sum();
    let mut report = Report {
        processes: traces.membership.count(),
        events: traces.event_count(),
        broadcasts,
        deliveries,
        snapshots: 0,
        verdict: Verdict::AllEmpty,
    };

    if traces.is_empty() {
        info!("all traces are empty");
        return Ok(report);
    }

    let snapshots = dependency::build(traces)?;
    report.snapshots = snapshots.len();

    let violations = OrderChecker::new(&snapshots).with_mode(mode).check(traces)?;
    report.verdict = if violations.is_empty() { Verdict::Fulfilled } else { Verdict::Violated { violations } };

    info!("{} broadcasts, {} deliveries: {:?}", report.broadcasts, report.deliveries, report.verdict);
    Ok(report)
}
