//! LMDB implementation of VoteLedger.
//!
//! Index keys are `field_bytes ++ 0x00 ++ seq_be` so every record sharing a
//! `voteID` (or `IP`) sits under one prefix. Listing them is a prefix
//! range-scan followed by point reads in the votes database. The separator
//! keeps `1.2.3.4` from matching `1.2.3.45`.

use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use ballot_store::{LedgerRecord, StoreError, VoteLedger};
use ballot_types::{NetworkAddress, VisitorIdentity, Vote};

use crate::LmdbError;

const SEPARATOR: u8 = 0x00;
const EMPTY: &[u8] = &[];

pub struct LmdbVoteLedger {
    pub(crate) env: Arc<Env>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) by_identity_db: Database<Bytes, Bytes>,
    pub(crate) by_address_db: Database<Bytes, Bytes>,
}

/// Build index key `field ++ 0x00 ++ seq_be`.
fn index_key(field: &str, seq: u64) -> Vec<u8> {
    let mut key = index_prefix(field);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

fn index_prefix(field: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(field.len() + 1 + 8);
    prefix.extend_from_slice(field.as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Increment a byte prefix to form the exclusive upper bound of a range scan.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return;
        }
        prefix.pop();
    }
}

impl LmdbVoteLedger {
    /// Sequence numbers of every record indexed under `field`.
    fn scan_index(
        &self,
        rtxn: &RoTxn,
        db: &Database<Bytes, Bytes>,
        field: &str,
    ) -> Result<Vec<u64>, LmdbError> {
        let prefix = index_prefix(field);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);
        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let mut seqs = Vec::new();
        for result in db.range(rtxn, &bounds)? {
            let (key, _) = result?;
            let tail: [u8; 8] = key[key.len() - 8..]
                .try_into()
                .map_err(|_| LmdbError::Heed("malformed index key".into()))?;
            seqs.push(u64::from_be_bytes(tail));
        }
        Ok(seqs)
    }

    fn find_indexed(
        &self,
        db: &Database<Bytes, Bytes>,
        field: &str,
    ) -> Result<Vec<LedgerRecord>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let mut records = Vec::new();
        for seq in self.scan_index(&rtxn, db, field)? {
            let bytes = self
                .votes_db
                .get(&rtxn, seq.to_be_bytes().as_slice())?
                .ok_or_else(|| LmdbError::NotFound(format!("vote #{seq}")))?;
            records.push(serde_json::from_slice(bytes)?);
        }
        Ok(records)
    }

    fn append_record(&self, record: &LedgerRecord) -> Result<u64, LmdbError> {
        let value = serde_json::to_vec(record)?;
        let mut wtxn = self.env.write_txn()?;
        let seq = match self.votes_db.last(&wtxn)? {
            Some((key, _)) => {
                let bytes: [u8; 8] = key
                    .try_into()
                    .map_err(|_| LmdbError::Heed("malformed vote key".into()))?;
                u64::from_be_bytes(bytes) + 1
            }
            None => 0,
        };
        self.votes_db
            .put(&mut wtxn, seq.to_be_bytes().as_slice(), &value)?;
        self.by_identity_db
            .put(&mut wtxn, &index_key(&record.vote_id, seq), EMPTY)?;
        if !record.ip.is_empty() {
            self.by_address_db
                .put(&mut wtxn, &index_key(&record.ip, seq), EMPTY)?;
        }
        wtxn.commit()?;
        Ok(seq)
    }

    fn all_records(&self) -> Result<Vec<LedgerRecord>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let mut records = Vec::new();
        for result in self.votes_db.iter(&rtxn)? {
            let (key, value) = result?;
            match serde_json::from_slice::<LedgerRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(key = ?key, error = %e, "skipping unreadable vote document")
                }
            }
        }
        Ok(records)
    }

    /// Number of stored vote documents.
    pub fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.votes_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl VoteLedger for LmdbVoteLedger {
    async fn find_by_identity(
        &self,
        identity: &VisitorIdentity,
    ) -> Result<Vec<LedgerRecord>, StoreError> {
        Ok(self.find_indexed(&self.by_identity_db, identity.as_str())?)
    }

    async fn find_by_address(
        &self,
        address: &NetworkAddress,
    ) -> Result<Vec<LedgerRecord>, StoreError> {
        if address.is_unknown() {
            return Ok(Vec::new());
        }
        Ok(self.find_indexed(&self.by_address_db, address.as_str())?)
    }

    async fn append(&self, vote: &Vote) -> Result<(), StoreError> {
        let seq = self.append_record(&LedgerRecord::from(vote))?;
        tracing::debug!(seq, option = %vote.option, "vote appended to LMDB ledger");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        Ok(self.all_records()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::DEFAULT_MAP_SIZE;
    use crate::LmdbEnvironment;
    use ballot_types::{Timestamp, VoteOption};

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).expect("open env");
        (dir, env)
    }

    fn vote(option: VoteOption, id: &str, ip: &str) -> Vote {
        Vote {
            option,
            identity_token: VisitorIdentity::new(id).unwrap(),
            network_address: NetworkAddress::new(ip),
            cast_at: Timestamp::from_millis(1_709_294_400_000),
        }
    }

    #[test]
    fn increment_prefix_carries() {
        let mut p = vec![0x01, 0xFF];
        increment_prefix(&mut p);
        assert_eq!(p, vec![0x02]);

        let mut q = b"abc\x00".to_vec();
        increment_prefix(&mut q);
        assert_eq!(q, b"abc\x01".to_vec());
    }

    #[tokio::test]
    async fn append_then_find_by_identity() {
        let (_dir, env) = temp_env();
        let ledger = env.vote_ledger();
        ledger.append(&vote(VoteOption::CandidateA, "tok-1", "10.0.0.1")).await.unwrap();
        ledger.append(&vote(VoteOption::CandidateB, "tok-2", "10.0.0.2")).await.unwrap();

        let found = ledger
            .find_by_identity(&VisitorIdentity::new("tok-1").unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].option, "CANDIDATE_A");
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn address_index_does_not_match_longer_address() {
        let (_dir, env) = temp_env();
        let ledger = env.vote_ledger();
        ledger.append(&vote(VoteOption::Abstain, "tok-1", "1.2.3.45")).await.unwrap();

        let found = ledger.find_by_address(&NetworkAddress::new("1.2.3.4")).await.unwrap();
        assert!(found.is_empty());
        let found = ledger.find_by_address(&NetworkAddress::new("1.2.3.45")).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn unknown_address_is_not_indexed() {
        let (_dir, env) = temp_env();
        let ledger = env.vote_ledger();
        ledger.append(&vote(VoteOption::Abstain, "tok-1", "")).await.unwrap();

        let found = ledger.find_by_address(&NetworkAddress::unknown()).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(ledger.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_appends_are_both_kept() {
        let (_dir, env) = temp_env();
        let ledger = env.vote_ledger();
        let v = vote(VoteOption::CandidateA, "tok-1", "10.0.0.1");
        ledger.append(&v).await.unwrap();
        ledger.append(&v).await.unwrap();

        let found = ledger.find_by_identity(&v.identity_token).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn votes_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
            env.vote_ledger()
                .append(&vote(VoteOption::CandidateB, "tok-9", "10.0.0.9"))
                .await
                .unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        let ledger = env.vote_ledger();
        let prior = ledger
            .has_vote_for(
                &VisitorIdentity::new("tok-9").unwrap(),
                &NetworkAddress::unknown(),
            )
            .await
            .unwrap();
        assert!(prior.by_identity);
    }
}
