//! Offline checker for the Local Causal Broadcast delivery order.
//!
//! Given each process's trace of broadcasts and deliveries and the static
//! `affected` relation, confirms that no process delivered a message before
//! the causally relevant deliveries its broadcaster had made when sending it.

pub mod checker;
pub mod dependency;
pub mod error;
pub mod loader;
pub mod report;
pub mod verifier;

pub use checker::{CheckMode, OrderChecker, Violation};
pub use dependency::{DependencyBuilder, DependencySnapshots};
pub use error::VerifyError;
pub use loader::{Trace, TraceLayout, TraceLoader, TraceSet, UnknownLinePolicy};
pub use report::{Report, Verdict};
pub use verifier::{verify, Verifier, VerifierConfig};

pub use lcb_proto as proto;
