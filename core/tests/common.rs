use std::str::FromStr;

use lcb_core::{CheckMode, Report, TraceLayout, UnknownLinePolicy, Verifier, VerifierConfig, VerifyError};
use tempfile::TempDir;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// Membership text for a group where `affected[i]` lists the processes affecting process `i + 1`.
/// Affected lines start with the process's own id, as the broadcasting processes write them.
pub fn membership(affected: &[&[u32]]) -> String {
    let n = affected.len();
    let mut out = format!("{}\n", n);
    for i in 1..=n {
        out.push_str(&format!("{} 127.0.0.1 {}\n", i, 11000 + i));
    }
    for (i, ids) in affected.iter().enumerate() {
        let mut line = vec![(i + 1).to_string()];
        line.extend(ids.iter().map(|id| id.to_string()));
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// A directory holding a membership file and one trace file per process.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new(membership: &str, traces: &[&str]) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("membership"), membership)?;
        for (i, trace) in traces.iter().enumerate() {
            std::fs::write(dir.path().join(format!("da_proc_{}.out", i + 1)), trace)?;
        }
        Ok(Self { dir })
    }

    pub fn path(&self) -> &std::path::Path { self.dir.path() }

    pub fn config(&self) -> VerifierConfig { VerifierConfig { layout: TraceLayout::in_dir(self.dir.path()), ..Default::default() } }

    #[allow(unused)]
    pub async fn run(&self) -> Result<Report, VerifyError> { Verifier::new(self.config()).run().await }

    #[allow(unused)]
    pub async fn run_with(&self, unknown_lines: UnknownLinePolicy, mode: CheckMode) -> Result<Report, VerifyError> {
        Verifier::new(VerifierConfig { unknown_lines, mode, ..self.config() }).run().await
    }
}
