//! LMDB storage backend for the ballot poll.
//!
//! Implements [`ballot_store::VoteLedger`] using the `heed` LMDB bindings.
//! Votes live in one database under a big-endian sequence key; two index
//! databases map `voteID` and `IP` to those sequence keys.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod ledger;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use ledger::LmdbVoteLedger;
