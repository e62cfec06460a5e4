//! Gate states.

use crate::VerificationToken;
use ballot_types::{Vote, VoteOption};
use std::fmt;

/// Where a visitor is in the voting flow.
///
/// Each state carries exactly the data valid in it, so combinations such as
/// "verified but blocked" cannot be represented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    /// No prior vote detected; waiting for the visitor to pick an option.
    Idle,
    /// An option was picked; the verification challenge is outstanding.
    AwaitingVerification { option: VoteOption },
    /// Verification succeeded; the token is kept so a failed append can be
    /// retried without a new challenge.
    Verified {
        option: VoteOption,
        token: VerificationToken,
    },
    /// A duplicate re-check and append are in flight.
    Submitting { ticket: SubmissionTicket },
    /// The vote was recorded. Terminal.
    Completed { vote: Vote },
    /// A vote already exists for this visitor. Terminal.
    Blocked,
}

impl GateState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingVerification { .. } => "awaiting-verification",
            Self::Verified { .. } => "verified",
            Self::Submitting { .. } => "submitting",
            Self::Completed { .. } => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Blocked)
    }

    /// Whether the visitor should see the options as selectable.
    pub fn accepts_votes(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle for one in-flight submission.
///
/// Completions are matched against the ticket id so a stale completion from
/// an abandoned attempt cannot move the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub(crate) id: u64,
    pub option: VoteOption,
    pub(crate) token: VerificationToken,
}

impl SubmissionTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}
