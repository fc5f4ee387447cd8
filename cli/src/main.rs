//! `lcb-check`: verify the Local Causal Broadcast delivery order of a finished run.
//!
//! Reads `membership` and `da_proc_<k>.out` from the working directory (or `--dir`),
//! prints a single status line on stdout and exits non-zero on a violation or bad input.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use lcb_core::{CheckMode, TraceLayout, UnknownLinePolicy, Verifier, VerifierConfig, VerifyError};
use tracing::Level;

const EXIT_VIOLATION: u8 = 1;
const EXIT_MALFORMED: u8 = 2;
const EXIT_IO: u8 = 3;
const EXIT_OTHER: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "lcb-check", version, about = "Check Local Causal Broadcast delivery order in process traces")]
struct Cli {
    /// Directory holding the membership file and the trace files
    #[arg(short = 'd', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// Membership file name, relative to --dir
    #[arg(long = "membership", default_value = "membership")]
    membership: String,

    /// Trace file name; `{}` is replaced by the process id
    #[arg(long = "trace-pattern", default_value = "da_proc_{}.out")]
    trace_pattern: String,

    /// Handling of trace lines that are neither `b` nor `d` lines
    #[arg(long = "unknown-lines", value_enum, default_value_t = UnknownLines::Reject)]
    unknown_lines: UnknownLines,

    /// Report every violation instead of stopping at the first
    #[arg(long = "all-violations", action = ArgAction::SetTrue)]
    all_violations: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv); LOG_LEVEL overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum UnknownLines {
    Reject,
    Ignore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn config(&self) -> VerifierConfig {
        VerifierConfig {
            layout: TraceLayout { dir: self.dir.clone(), membership: self.membership.clone(), trace_pattern: self.trace_pattern.clone() },
            unknown_lines: match self.unknown_lines {
                UnknownLines::Reject => UnknownLinePolicy::Reject,
                UnknownLines::Ignore => UnknownLinePolicy::Ignore,
            },
            mode: if self.all_violations { CheckMode::CollectAll } else { CheckMode::FirstViolation },
        }
    }

    fn log_level(&self) -> Level {
        if let Some(level) = std::env::var("LOG_LEVEL").ok().and_then(|l| Level::from_str(&l).ok()) {
            return level;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // logs go to stderr so stdout carries only the verdict
    tracing_subscriber::fmt().with_max_level(cli.log_level()).with_writer(std::io::stderr).init();

    let status = match run(&cli).await {
        Ok(status) => status,
        Err(err) => {
            println!("Error: {:#}", err);
            exit_status(&err)
        }
    };
    ExitCode::from(status)
}

async fn run(cli: &Cli) -> Result<u8> {
    let report = Verifier::new(cli.config()).run().await?;
    match cli.format {
        OutputFormat::Text => println!("{}", report.verdict),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(if report.verdict.is_success() { 0 } else { EXIT_VIOLATION })
}

fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<VerifyError>() {
        Some(e) if e.is_malformed() => EXIT_MALFORMED,
        Some(_) => EXIT_IO,
        None => EXIT_OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcb_core::proto::{MessageId, ProcessId};

    #[test]
    fn test_defaults_match_process_output_layout() {
        let cli = Cli::try_parse_from(["lcb-check"]).unwrap();
        let config = cli.config();
        assert_eq!(config.layout, TraceLayout::default());
        assert_eq!(config.unknown_lines, UnknownLinePolicy::Reject);
        assert_eq!(config.mode, CheckMode::FirstViolation);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "lcb-check",
            "--dir",
            "/tmp/run",
            "--trace-pattern",
            "proc{}.log",
            "--unknown-lines",
            "ignore",
            "--all-violations",
            "-f",
            "json",
            "-vv",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.layout.trace_path(ProcessId(3)), PathBuf::from("/tmp/run/proc3.log"));
        assert_eq!(config.unknown_lines, UnknownLinePolicy::Ignore);
        assert_eq!(config.mode, CheckMode::CollectAll);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_exit_codes() {
        let io = anyhow::Error::from(VerifyError::Io { path: PathBuf::from("membership"), source: std::io::ErrorKind::NotFound.into() });
        assert_eq!(exit_status(&io), EXIT_IO);

        let malformed = anyhow::Error::from(VerifyError::UnknownMessage { process: ProcessId(2), message: MessageId::from((9, 1)) });
        assert_eq!(exit_status(&malformed), EXIT_MALFORMED);

        assert_eq!(exit_status(&anyhow::anyhow!("other")), EXIT_OTHER);
    }
}
