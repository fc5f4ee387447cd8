use std::path::PathBuf;

use lcb_proto::{DecodeError, MembershipError, MessageId, ProcessId, Seq};
use thiserror::Error;

/// A failure that prevents a verdict from being reached.
///
/// Ordering violations are not errors; they are part of the verdict
/// (see [`crate::report::Verdict`]).
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed membership file {}: {source}", .path.display())]
    Membership {
        path: PathBuf,
        #[source]
        source: MembershipError,
    },

    #[error("malformed trace {} line {line}: {source}", .path.display())]
    MalformedTrace {
        path: PathBuf,
        line: usize,
        #[source]
        source: DecodeError,
    },

    #[error("malformed trace: p{process} broadcasts sequence number {seq} more than once")]
    DuplicateBroadcast { process: ProcessId, seq: Seq },

    #[error("malformed trace: p{process} delivers {message}, which was never broadcast")]
    UnknownMessage { process: ProcessId, message: MessageId },
}

impl VerifyError {
    /// True for faults in the input contents, false for failures to read them.
    pub fn is_malformed(&self) -> bool { !matches!(self, VerifyError::Io { .. }) }
}
