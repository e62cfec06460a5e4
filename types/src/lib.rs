//! Fundamental types for the ballot poll.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! the fixed option set, visitor identities, network addresses, votes and timestamps.

pub mod error;
pub mod identity;
pub mod option;
pub mod time;
pub mod vote;

pub use error::TypesError;
pub use identity::{NetworkAddress, VisitorIdentity};
pub use option::VoteOption;
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::Vote;
