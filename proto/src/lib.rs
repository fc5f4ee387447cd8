//! Data model shared by the LCB trace checker: process and message ids, trace
//! events with their line format, and the group membership description.

pub mod error;
pub mod event;
pub mod id;
pub mod membership;

pub use error::*;
pub use event::*;
pub use id::*;
pub use membership::*;
