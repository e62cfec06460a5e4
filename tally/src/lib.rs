//! Tally aggregation.
//!
//! The tally is never stored. It is recomputed from the ledger's current
//! contents on every read.

pub mod aggregator;
pub mod tally;

pub use aggregator::TallyAggregator;
pub use tally::{compute_tally, VoteTally};
