//! State management module.
//!
//! Contains the per-channel meeting/motion records, the vote tally, and the
//! membership snapshot the engine reads privileges from.

mod channel;
mod members;
mod tally;

pub use channel::{ChannelState, ExternalVote, Meeting, Motion, MotionMinute, Vote};
pub use members::{MemberTable, MembershipView};
pub use tally::{Outcome, Tally};
