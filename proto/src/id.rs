use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DecodeError;

/// Sequence number a broadcaster assigns to each of its messages.
pub type Seq = u64;

/// A member of the group, numbered from 1.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    pub fn from_index(index: usize) -> Self { ProcessId(index as u32 + 1) }

    /// Every process of a group of `count` members, in id order.
    pub fn all(count: u32) -> impl Iterator<Item = ProcessId> { (1..=count).map(ProcessId) }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Debug for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "p{}", self.0) }
}

impl TryFrom<&str> for ProcessId {
    type Error = DecodeError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        match token.parse::<u32>() {
            Ok(0) | Err(_) => Err(DecodeError::InvalidInteger(token.to_owned())),
            Ok(id) => Ok(ProcessId(id)),
        }
    }
}

/// Identifies one broadcast message: who broadcast it and under which sequence number.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MessageId {
    pub broadcaster: ProcessId,
    pub seq: Seq,
}

impl MessageId {
    pub fn new(broadcaster: ProcessId, seq: Seq) -> Self { Self { broadcaster, seq } }
}

impl From<(u32, Seq)> for MessageId {
    fn from((broadcaster, seq): (u32, Seq)) -> Self { Self { broadcaster: ProcessId(broadcaster), seq } }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "({}, {})", self.broadcaster, self.seq) }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self) }
}

pub(crate) fn parse_seq(token: &str) -> Result<Seq, DecodeError> {
    token.parse::<Seq>().map_err(|_| DecodeError::InvalidInteger(token.to_owned()))
}
