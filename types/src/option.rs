//! The fixed set of poll options.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the poll's fixed choices.
///
/// The wire form (stored in ledger records) is the upper-case name,
/// e.g. `CANDIDATE_A`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteOption {
    CandidateA,
    CandidateB,
    Abstain,
}

impl VoteOption {
    /// Every option, in display order.
    pub const ALL: [VoteOption; 3] = [Self::CandidateA, Self::CandidateB, Self::Abstain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CandidateA => "CANDIDATE_A",
            Self::CandidateB => "CANDIDATE_B",
            Self::Abstain => "ABSTAIN",
        }
    }

    /// Parse the stored wire form exactly. Unlike [`FromStr`], no case
    /// folding, trimming or `-` mapping is applied.
    pub fn from_wire(s: &str) -> Result<Self, TypesError> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| TypesError::UnknownOption(s.to_string()))
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteOption {
    type Err = TypesError;

    /// Accepts the wire form. Matching is case-insensitive and treats `-`
    /// as `_`, so `candidate-a` on a command line parses too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == normalized)
            .ok_or_else(|| TypesError::UnknownOption(s.to_string()))
    }
}
