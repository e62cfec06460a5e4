//! Event payloads.

use ballot_types::VoteOption;
use serde::{Deserialize, Serialize};

/// A notable moment in a visitor's session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PollEvent {
    /// The poll was opened.
    PageView,
    /// A vote was appended to the ledger.
    VoteSubmitted { option: VoteOption },
    /// A submission failed.
    VoteError { message: String },
}

impl PollEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::VoteSubmitted { .. } => "vote_submitted",
            Self::VoteError { .. } => "vote_error",
        }
    }
}
