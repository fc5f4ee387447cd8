//! Trace events and their on-disk line format.
//!
//! Each process writes one line per event to its output file:
//! `b <seq>` when it broadcasts and `d <sender> <seq>` when it delivers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::id::{parse_seq, MessageId, ProcessId, Seq};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// The tracing process broadcast its message `seq`.
    Broadcast { seq: Seq },
    /// The tracing process delivered `message`.
    Deliver { message: MessageId },
}

impl Event {
    pub fn broadcast(seq: Seq) -> Self { Event::Broadcast { seq } }

    pub fn deliver(broadcaster: u32, seq: Seq) -> Self { Event::Deliver { message: MessageId::from((broadcaster, seq)) } }

    pub fn is_broadcast(&self) -> bool { matches!(self, Event::Broadcast { .. }) }

    pub fn is_deliver(&self) -> bool { matches!(self, Event::Deliver { .. }) }

    /// The message this event concerns, given the process whose trace it came from.
    pub fn message(&self, process: ProcessId) -> MessageId {
        match self {
            Event::Broadcast { seq } => MessageId::new(process, *seq),
            Event::Deliver { message } => *message,
        }
    }
}

impl FromStr for Event {
    type Err = DecodeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let event = match tokens.next() {
            None => return Err(DecodeError::EmptyInput),
            Some("b") => {
                let seq = parse_seq(tokens.next().ok_or(DecodeError::MissingToken("sequence number"))?)?;
                Event::Broadcast { seq }
            }
            Some("d") => {
                let broadcaster = ProcessId::try_from(tokens.next().ok_or(DecodeError::MissingToken("broadcaster"))?)?;
                let seq = parse_seq(tokens.next().ok_or(DecodeError::MissingToken("sequence number"))?)?;
                Event::Deliver { message: MessageId::new(broadcaster, seq) }
            }
            Some(_) => return Err(DecodeError::UnknownPrefix(line.trim_end().to_owned())),
        };
        if let Some(extra) = tokens.next() {
            return Err(DecodeError::TrailingToken(extra.to_owned()));
        }
        Ok(event)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Broadcast { seq } => write!(f, "b {}", seq),
            Event::Deliver { message } => write!(f, "d {} {}", message.broadcaster, message.seq),
        }
    }
}
