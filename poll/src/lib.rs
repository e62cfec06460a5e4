//! The poll session.
//!
//! A [`PollSession`] is one visitor's view of the poll. Opening it resolves
//! the visitor's identity and address, checks the ledger for a prior vote and
//! seeds the vote gate. Casting drives the gate through human verification,
//! the duplicate re-check and the append, then refreshes the tally.

pub mod config;
pub mod error;
pub mod report;
pub mod session;

pub use config::{OptionLabels, PollConfig};
pub use error::PollError;
pub use report::render_tally;
pub use session::{CastOutcome, Collaborators, PollSession};
