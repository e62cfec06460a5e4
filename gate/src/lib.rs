//! Vote gate.
//!
//! Every vote passes two checks before it may be appended to the ledger:
//! 1. **Human verification**: a challenge completed by the visitor, yielding a token.
//! 2. **Duplicate check**: no ledger record for the visitor's identity or address,
//!    re-checked immediately before the append.
//!
//! The gate itself is a synchronous state machine. It never awaits; callers
//! drive the collaborators and report results back through its transitions.
//!
//! The verification *provider* is modular: the gate only requires *that* a
//! non-empty token was obtained, not *how*.

pub mod error;
pub mod machine;
pub mod state;
pub mod verifier;

pub use error::GateError;
pub use machine::{IntentOutcome, VoteGate};
pub use state::{GateState, SubmissionTicket};
pub use verifier::{HumanVerifier, VerificationToken};
