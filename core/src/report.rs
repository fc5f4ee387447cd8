use std::fmt;

use serde::Serialize;

use crate::checker::Violation;

/// Outcome of a run that got as far as a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// No process recorded any event.
    AllEmpty,
    Fulfilled,
    /// One violation by default; every violation found in collect-all mode.
    Violated { violations: Vec<Violation> },
}

impl Verdict {
    pub fn is_success(&self) -> bool { !matches!(self, Verdict::Violated { .. }) }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Verdict::Violated { violations } => violations,
            _ => &[],
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::AllEmpty => write!(f, "All input files are empty."),
            Verdict::Fulfilled => write!(f, "LCB properties fulfilled."),
            Verdict::Violated { violations } => {
                let lines: Vec<String> = violations.iter().map(|v| format!("Error: {}", v)).collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

/// A verdict together with the size of the input it was reached on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub processes: u32,
    pub events: usize,
    pub broadcasts: usize,
    pub deliveries: usize,
    pub snapshots: usize,
    pub verdict: Verdict,
}
