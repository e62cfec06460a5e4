//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every external collaborator of a poll session (clock, vote ledger, token
//! storage, address lookup, human verifier, event sink) is abstracted behind
//! a trait. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including failure injection
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod verifier;

pub use clock::NullClock;
pub use events::NullEventSink;
pub use identity::{NullAddressLookup, NullTokenStorage};
pub use ledger::NullLedger;
pub use verifier::NullVerifier;
