use ballot_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The ledger could not be read or written. Retry is permitted and no
    /// gate state is lost.
    #[error("the vote store is temporarily unavailable: {0}")]
    TransientStorage(String),

    /// The prior-vote check made when the poll opened could not reach the
    /// ledger. The visitor's status is unknown; nothing was attempted.
    #[error("the vote store could not be checked: {0}")]
    InitialCheckUnavailable(String),

    /// The visitor's identity or address already has a vote on record.
    #[error("a vote has already been recorded for this visitor")]
    DuplicateVote,

    /// A vote was attempted before human verification succeeded.
    #[error("human verification has not been completed")]
    VerificationIncomplete,
}

impl GateError {
    /// Whether the visitor should be asked to act ("try again").
    ///
    /// Only storage failures during submission are actionable; the rest are
    /// informational.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::TransientStorage(_))
    }

    /// Visitor-facing wording.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::TransientStorage(_) => "Your vote could not be saved. Please try again.",
            Self::InitialCheckUnavailable(_) => {
                "Poll results are unavailable right now. Please try again later."
            }
            Self::DuplicateVote => "You have already voted in this poll. Thanks for taking part!",
            Self::VerificationIncomplete => "Please complete the verification challenge to vote.",
        }
    }
}

impl From<StoreError> for GateError {
    fn from(e: StoreError) -> Self {
        GateError::TransientStorage(e.to_string())
    }
}
