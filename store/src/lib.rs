//! Abstract vote ledger for the ballot poll.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`VoteLedger`]. The rest of the codebase depends only on the trait.
//!
//! The ledger holds no uniqueness constraint: whether a visitor may vote is
//! decided by the caller before [`VoteLedger::append`].

pub mod error;
pub mod ledger;
pub mod record;

pub use error::StoreError;
pub use ledger::{DuplicatePolicy, PriorVote, VoteLedger};
pub use record::LedgerRecord;
