//! Vote ledger trait and the duplicate-vote predicate.

use crate::{LedgerRecord, StoreError};
use async_trait::async_trait;
use ballot_types::{NetworkAddress, VisitorIdentity, Vote};
use serde::{Deserialize, Serialize};

/// Append-only store of cast votes.
///
/// `append` performs no duplicate check. Two concurrent appends for the same
/// identity both succeed; callers are expected to consult
/// [`VoteLedger::has_vote_for`] first.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Records whose `voteID` equals the identity token.
    async fn find_by_identity(
        &self,
        identity: &VisitorIdentity,
    ) -> Result<Vec<LedgerRecord>, StoreError>;

    /// Records whose `IP` equals the address.
    async fn find_by_address(
        &self,
        address: &NetworkAddress,
    ) -> Result<Vec<LedgerRecord>, StoreError>;

    /// Add a vote to the ledger.
    async fn append(&self, vote: &Vote) -> Result<(), StoreError>;

    /// Every record currently stored, in no particular order.
    async fn read_all(&self) -> Result<Vec<LedgerRecord>, StoreError>;

    /// Evaluate both duplicate clauses. The two lookups run concurrently.
    ///
    /// An unknown address is never looked up and never matches.
    async fn has_vote_for(
        &self,
        identity: &VisitorIdentity,
        address: &NetworkAddress,
    ) -> Result<PriorVote, StoreError> {
        let by_address = async {
            if address.is_unknown() {
                Ok(false)
            } else {
                self.find_by_address(address).await.map(|r| !r.is_empty())
            }
        };
        let by_identity = async { self.find_by_identity(identity).await.map(|r| !r.is_empty()) };
        let (by_identity, by_address) = tokio::join!(by_identity, by_address);
        let prior = PriorVote {
            by_identity: by_identity?,
            by_address: by_address?,
        };
        tracing::debug!(
            identity = %identity,
            address = %address,
            by_identity = prior.by_identity,
            by_address = prior.by_address,
            "duplicate check"
        );
        Ok(prior)
    }
}

/// Outcome of the two duplicate clauses, kept separate so each can be
/// inspected and toggled on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriorVote {
    /// A record carries this visitor's identity token.
    pub by_identity: bool,
    /// A record carries this visitor's network address.
    pub by_address: bool,
}

impl PriorVote {
    /// Whether the visitor counts as having voted under `policy`.
    ///
    /// Identity clause OR address clause. A shared household address
    /// therefore blocks everyone behind it when `match_address` is on.
    pub fn matches(&self, policy: &DuplicatePolicy) -> bool {
        (policy.match_identity && self.by_identity) || (policy.match_address && self.by_address)
    }
}

/// Which duplicate clauses are enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePolicy {
    #[serde(default = "default_true")]
    pub match_identity: bool,
    #[serde(default = "default_true")]
    pub match_address: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self {
            match_identity: true,
            match_address: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{Timestamp, VoteOption};
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecLedger(Mutex<Vec<LedgerRecord>>);

    #[async_trait]
    impl VoteLedger for VecLedger {
        async fn find_by_identity(
            &self,
            identity: &VisitorIdentity,
        ) -> Result<Vec<LedgerRecord>, StoreError> {
            let records = self.0.lock().unwrap();
            Ok(records.iter().filter(|r| r.vote_id == identity.as_str()).cloned().collect())
        }

        async fn find_by_address(
            &self,
            address: &NetworkAddress,
        ) -> Result<Vec<LedgerRecord>, StoreError> {
            let records = self.0.lock().unwrap();
            Ok(records.iter().filter(|r| r.ip == address.as_str()).cloned().collect())
        }

        async fn append(&self, vote: &Vote) -> Result<(), StoreError> {
            self.0.lock().unwrap().push(LedgerRecord::from(vote));
            Ok(())
        }

        async fn read_all(&self) -> Result<Vec<LedgerRecord>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    fn identity(s: &str) -> VisitorIdentity {
        VisitorIdentity::new(s).unwrap()
    }

    fn vote(id: &str, ip: NetworkAddress) -> Vote {
        Vote {
            option: VoteOption::CandidateA,
            identity_token: identity(id),
            network_address: ip,
            cast_at: Timestamp::from_millis(1_000),
        }
    }

    #[tokio::test]
    async fn identity_clause_matches_after_append() {
        let ledger = VecLedger::default();
        ledger.append(&vote("t1", NetworkAddress::new("10.0.0.1"))).await.unwrap();

        let prior = ledger
            .has_vote_for(&identity("t1"), &NetworkAddress::new("192.0.2.9"))
            .await
            .unwrap();
        assert_eq!(prior, PriorVote { by_identity: true, by_address: false });
        assert!(prior.matches(&DuplicatePolicy::default()));
    }

    #[tokio::test]
    async fn address_clause_matches_other_identity() {
        let ledger = VecLedger::default();
        ledger.append(&vote("t1", NetworkAddress::new("10.0.0.1"))).await.unwrap();

        let prior = ledger
            .has_vote_for(&identity("t2"), &NetworkAddress::new("10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(prior, PriorVote { by_identity: false, by_address: true });
    }

    #[tokio::test]
    async fn unknown_address_never_matches_unknown_records() {
        let ledger = VecLedger::default();
        ledger.append(&vote("t1", NetworkAddress::unknown())).await.unwrap();

        let prior = ledger
            .has_vote_for(&identity("t2"), &NetworkAddress::unknown())
            .await
            .unwrap();
        assert_eq!(prior, PriorVote::default());
    }

    #[test]
    fn clauses_toggle_independently() {
        let address_only = PriorVote { by_identity: false, by_address: true };
        let identity_only = PriorVote { by_identity: true, by_address: false };

        let no_address = DuplicatePolicy { match_identity: true, match_address: false };
        assert!(!address_only.matches(&no_address));
        assert!(identity_only.matches(&no_address));

        let no_identity = DuplicatePolicy { match_identity: false, match_address: true };
        assert!(address_only.matches(&no_identity));
        assert!(!identity_only.matches(&no_identity));

        assert!(!PriorVote::default().matches(&DuplicatePolicy::default()));
    }
}
