#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    EmptyInput,
    InvalidInteger(String),
    InvalidProcessCount(String),
    MissingToken(&'static str),
    TrailingToken(String),
    UnknownPrefix(String),
    MissingLine(usize),
    ProcessOutOfRange { id: u64, count: u32 },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::EmptyInput => write!(f, "Empty input"),
            DecodeError::InvalidInteger(token) => write!(f, "Invalid integer: {:?}", token),
            DecodeError::InvalidProcessCount(token) => write!(f, "Invalid process count: {:?}", token),
            DecodeError::MissingToken(what) => write!(f, "Missing {}", what),
            DecodeError::TrailingToken(token) => write!(f, "Unexpected trailing token: {:?}", token),
            DecodeError::UnknownPrefix(line) => write!(f, "Unknown line prefix: {:?}", line),
            DecodeError::MissingLine(line) => write!(f, "Missing line {}", line),
            DecodeError::ProcessOutOfRange { id, count } => write!(f, "Process {} outside of group 1..={}", id, count),
        }
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    /// True when the line was not a trace line at all, as opposed to a broken `b`/`d` line.
    pub fn is_unknown_prefix(&self) -> bool { matches!(self, DecodeError::UnknownPrefix(_)) }
}
