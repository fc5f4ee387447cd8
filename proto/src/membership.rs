//! The group membership description.
//!
//! ```text
//! N
//! <N host lines, unused by the checker>
//! <N affected lines, one per process in id order>
//! ```
//!
//! Each affected line lists whitespace-separated process ids. Processes write
//! their own id as the first token; that entry is redundant since every process
//! is relevant to itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::id::ProcessId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    count: u32,
    hosts: Vec<String>,
    affected: Vec<BTreeSet<ProcessId>>,
}

/// A membership parse failure, with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipError {
    pub line: usize,
    pub error: DecodeError,
}

impl fmt::Display for MembershipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "line {}: {}", self.line, self.error) }
}

impl std::error::Error for MembershipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.error) }
}

impl Membership {
    /// Build a membership directly from per-process affected sets, `affected[0]` belonging to process 1.
    pub fn new(affected: Vec<BTreeSet<ProcessId>>) -> Self {
        let count = affected.len() as u32;
        Self { count, hosts: vec![String::new(); affected.len()], affected }
    }

    /// Group size `N`.
    pub fn count(&self) -> u32 { self.count }

    pub fn processes(&self) -> impl Iterator<Item = ProcessId> { ProcessId::all(self.count) }

    /// Host descriptor lines, passed through verbatim.
    pub fn hosts(&self) -> &[String] { &self.hosts }

    /// Affected set of `process`, or `None` when it is not a member of the group.
    pub fn affected(&self, process: ProcessId) -> Option<&BTreeSet<ProcessId>> {
        process.0.checked_sub(1).and_then(|index| self.affected.get(index as usize))
    }

    /// Whether deliveries of `broadcaster`'s messages are causally relevant to `process`.
    pub fn is_relevant(&self, process: ProcessId, broadcaster: ProcessId) -> bool {
        broadcaster == process || self.affected(process).is_some_and(|set| set.contains(&broadcaster))
    }
}

impl FromStr for Membership {
    type Err = MembershipError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = input.lines().collect();
        let at = |line: usize, error: DecodeError| MembershipError { line, error };

        let first = lines.first().map(|l| l.trim()).filter(|l| !l.is_empty()).ok_or(at(1, DecodeError::EmptyInput))?;
        let count = match first.parse::<u32>() {
            Ok(0) | Err(_) => return Err(at(1, DecodeError::InvalidProcessCount(first.to_owned()))),
            Ok(n) => n,
        };
        let n = count as usize;
        // every host and affected line must be present before anything is sized from `n`
        if lines.len() <= 2 * n {
            let missing = lines.len() + 1;
            return Err(at(missing, DecodeError::MissingLine(missing)));
        }

        let hosts = lines[1..=n].iter().map(|line| line.trim_end().to_owned()).collect();

        let mut affected = Vec::with_capacity(n);
        for (offset, line) in lines[n + 1..=2 * n].iter().enumerate() {
            let line_no = n + 2 + offset;
            let mut set = BTreeSet::new();
            for token in line.split_whitespace() {
                let id = token.parse::<u64>().map_err(|_| at(line_no, DecodeError::InvalidInteger(token.to_owned())))?;
                if id == 0 || id > count as u64 {
                    return Err(at(line_no, DecodeError::ProcessOutOfRange { id, count }));
                }
                set.insert(ProcessId(id as u32));
            }
            affected.push(set);
        }

        Ok(Self { count, hosts, affected })
    }
}
