//! Stored document form of a vote.

use ballot_types::{NetworkAddress, Timestamp, TypesError, VisitorIdentity, Vote, VoteOption};
use serde::{Deserialize, Serialize};

/// One ledger document.
///
/// Field names follow the document store's schema. Nothing is enforced at
/// the storage layer, so `option` may hold a value outside [`VoteOption`]
/// and readers must tolerate that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub option: String,
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(rename = "voteID")]
    pub vote_id: String,
    /// ISO-8601 time of casting.
    #[serde(default)]
    pub timestamp: String,
}

impl LedgerRecord {
    /// The recognized option, if any. Only the exact wire form counts.
    pub fn vote_option(&self) -> Result<VoteOption, TypesError> {
        VoteOption::from_wire(&self.option)
    }

    /// Convert back into a typed [`Vote`]. Fails on an unrecognized option,
    /// an empty `voteID` or an unparseable timestamp.
    pub fn to_vote(&self) -> Result<Vote, TypesError> {
        Ok(Vote {
            option: self.vote_option()?,
            identity_token: VisitorIdentity::new(self.vote_id.clone())?,
            network_address: NetworkAddress::new(self.ip.clone()),
            cast_at: Timestamp::parse_iso8601(&self.timestamp)?,
        })
    }
}

impl From<&Vote> for LedgerRecord {
    fn from(vote: &Vote) -> Self {
        Self {
            option: vote.option.as_str().to_string(),
            ip: vote.network_address.as_str().to_string(),
            vote_id: vote.identity_token.as_str().to_string(),
            timestamp: vote.cast_at.to_iso8601(),
        }
    }
}
