//! Reads the membership description and the per-process trace files.

use std::path::{Path, PathBuf};

use futures::future;
use lcb_proto::{Event, Membership, ProcessId};
use tracing::{debug, instrument, warn};

use crate::error::VerifyError;

/// Where the input files live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLayout {
    pub dir: PathBuf,
    pub membership: String,
    /// File name of each trace, with `{}` standing for the 1-based process id.
    pub trace_pattern: String,
}

impl Default for TraceLayout {
    fn default() -> Self { Self { dir: PathBuf::from("."), membership: "membership".to_owned(), trace_pattern: "da_proc_{}.out".to_owned() } }
}

impl TraceLayout {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into(), ..Default::default() } }

    pub fn membership_path(&self) -> PathBuf { self.dir.join(&self.membership) }

    pub fn trace_path(&self, process: ProcessId) -> PathBuf { self.dir.join(self.trace_pattern.replace("{}", &process.to_string())) }
}

/// What to do with trace lines that are neither broadcasts nor deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownLinePolicy {
    /// Fail the run with [`VerifyError::MalformedTrace`].
    #[default]
    Reject,
    /// Skip the line with a warning.
    Ignore,
}

/// The recorded events of one process, in the order it wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub process: ProcessId,
    pub events: Vec<Event>,
}

impl Trace {
    pub fn new(process: ProcessId, events: Vec<Event>) -> Self { Self { process, events } }

    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    pub fn broadcasts(&self) -> usize { self.events.iter().filter(|e| e.is_broadcast()).count() }

    pub fn deliveries(&self) -> usize { self.events.iter().filter(|e| e.is_deliver()).count() }
}

/// Everything a verification run consumes: the membership and one trace per process, in id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSet {
    pub membership: Membership,
    pub traces: Vec<Trace>,
}

impl TraceSet {
    /// Pair a membership with per-process event lists, `events[0]` belonging to process 1.
    pub fn new(membership: Membership, events: Vec<Vec<Event>>) -> Self {
        let traces = events.into_iter().enumerate().map(|(i, events)| Trace::new(ProcessId::from_index(i), events)).collect();
        Self { membership, traces }
    }

    /// True when no process recorded a single event.
    pub fn is_empty(&self) -> bool { self.traces.iter().all(Trace::is_empty) }

    pub fn event_count(&self) -> usize { self.traces.iter().map(|t| t.events.len()).sum() }
}

pub struct TraceLoader {
    layout: TraceLayout,
    unknown_lines: UnknownLinePolicy,
}

impl TraceLoader {
    pub fn new(layout: TraceLayout) -> Self { Self { layout, unknown_lines: UnknownLinePolicy::default() } }

    pub fn with_unknown_lines(mut self, policy: UnknownLinePolicy) -> Self {
        self.unknown_lines = policy;
        self
    }

    /// Load the membership, then every trace it names. Trace files are read concurrently.
    #[instrument(skip_all, fields(dir = %self.layout.dir.display()))]
    pub async fn load(&self) -> Result<TraceSet, VerifyError> {
        let path = self.layout.membership_path();
        let text = read(&path).await?;
        let membership: Membership = text.parse().map_err(|source| VerifyError::Membership { path, source })?;
        debug!("membership lists {} processes", membership.count());

        let reads = membership.processes().map(|process| self.load_trace(process));
        let traces = future::join_all(reads).await.into_iter().collect::<Result<Vec<_>, _>>()?;

        Ok(TraceSet { membership, traces })
    }

    async fn load_trace(&self, process: ProcessId) -> Result<Trace, VerifyError> {
        let path = self.layout.trace_path(process);
        let text = read(&path).await?;
        let trace = parse_trace(process, &path, &text, self.unknown_lines)?;
        debug!("{:?}: {} events from {}", process, trace.events.len(), path.display());
        Ok(trace)
    }
}

async fn read(path: &Path) -> Result<String, VerifyError> {
    tokio::fs::read_to_string(path).await.map_err(|source| VerifyError::Io { path: path.to_path_buf(), source })
}

/// Parse the contents of one trace file. Blank lines are skipped; line numbers in errors are 1-based.
pub fn parse_trace(process: ProcessId, path: &Path, text: &str, unknown_lines: UnknownLinePolicy) -> Result<Trace, VerifyError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        match line.parse::<Event>() {
            Ok(event) => events.push(event),
            Err(e) if e.is_unknown_prefix() && unknown_lines == UnknownLinePolicy::Ignore => {
                warn!("{}:{}: ignoring unrecognised line {:?}", path.display(), index + 1, line);
            }
            Err(source) => return Err(VerifyError::MalformedTrace { path: path.to_path_buf(), line: index + 1, source }),
        }
    }
    Ok(Trace::new(process, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcb_proto::DecodeError;

    fn parse(text: &str, policy: UnknownLinePolicy) -> Result<Trace, VerifyError> {
        parse_trace(ProcessId(1), Path::new("da_proc_1.out"), text, policy)
    }

    #[test]
    fn test_trace_paths() {
        let layout = TraceLayout::in_dir("/tmp/run");
        assert_eq!(layout.membership_path(), PathBuf::from("/tmp/run/membership"));
        assert_eq!(layout.trace_path(ProcessId(12)), PathBuf::from("/tmp/run/da_proc_12.out"));
    }

    #[test]
    fn test_parse_trace_strips_trailing_whitespace() {
        let trace = parse("b 1 \nd 1 1 \n\nd 2 1\n", UnknownLinePolicy::Reject).unwrap();
        assert_eq!(trace.events, vec![Event::broadcast(1), Event::deliver(1, 1), Event::deliver(2, 1)]);
        assert_eq!(trace.broadcasts(), 1);
        assert_eq!(trace.deliveries(), 2);
    }

    #[test]
    fn test_unknown_lines_rejected_by_default() {
        match parse("b 1\n# restarted\nb 2\n", UnknownLinePolicy::Reject) {
            Err(VerifyError::MalformedTrace { line, source, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(source, DecodeError::UnknownPrefix("# restarted".to_owned()));
            }
            other => panic!("expected malformed trace, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_lines_ignored_on_request() {
        let trace = parse("b 1\n# restarted\nb 2\n", UnknownLinePolicy::Ignore).unwrap();
        assert_eq!(trace.events, vec![Event::broadcast(1), Event::broadcast(2)]);
    }

    #[test]
    fn test_broken_lines_rejected_under_either_policy() {
        for policy in [UnknownLinePolicy::Reject, UnknownLinePolicy::Ignore] {
            assert!(matches!(parse("d 1\n", policy), Err(VerifyError::MalformedTrace { line: 1, .. })));
        }
    }
}
