//! Nullable vote ledger — in-memory records with failure injection.

use async_trait::async_trait;
use ballot_store::{LedgerRecord, StoreError, VoteLedger};
use ballot_types::{NetworkAddress, VisitorIdentity, Vote};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory ledger.
///
/// Every operation yields to the scheduler once before touching the records,
/// standing in for the network round trip of a remote store. Two sessions
/// joined on the same task therefore interleave their checks and appends the
/// way two browser tabs would.
#[derive(Default)]
pub struct NullLedger {
    records: Mutex<Vec<LedgerRecord>>,
    failing_appends: AtomicUsize,
    reads_down: AtomicBool,
    appends: AtomicUsize,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger pre-seeded with `records`, written verbatim.
    pub fn with_records(records: Vec<LedgerRecord>) -> Self {
        let ledger = Self::default();
        *ledger.records.lock().unwrap() = records;
        ledger
    }

    /// Insert a raw document, bypassing [`Vote`] typing. Used to plant
    /// malformed records.
    pub fn insert_raw(&self, record: LedgerRecord) {
        self.records.lock().unwrap().push(record);
    }

    /// Make the next `n` appends fail with [`StoreError::Unavailable`].
    pub fn fail_next_appends(&self, n: usize) {
        self.failing_appends.store(n, Ordering::SeqCst);
    }

    /// Make every read fail until switched back.
    pub fn set_reads_down(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Number of successful appends.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null ledger reads down".into()));
        }
        Ok(())
    }

    fn filtered(&self, keep: impl Fn(&LedgerRecord) -> bool) -> Vec<LedgerRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VoteLedger for NullLedger {
    async fn find_by_identity(
        &self,
        identity: &VisitorIdentity,
    ) -> Result<Vec<LedgerRecord>, StoreError> {
        tokio::task::yield_now().await;
        self.check_reads()?;
        Ok(self.filtered(|r| r.vote_id == identity.as_str()))
    }

    async fn find_by_address(
        &self,
        address: &NetworkAddress,
    ) -> Result<Vec<LedgerRecord>, StoreError> {
        tokio::task::yield_now().await;
        self.check_reads()?;
        if address.is_unknown() {
            return Ok(Vec::new());
        }
        Ok(self.filtered(|r| r.ip == address.as_str()))
    }

    async fn append(&self, vote: &Vote) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        let injected = self
            .failing_appends
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("null ledger append failure".into()));
        }
        self.records.lock().unwrap().push(LedgerRecord::from(vote));
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        tokio::task::yield_now().await;
        self.check_reads()?;
        Ok(self.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{Timestamp, VoteOption};

    fn vote(token: &str, ip: &str) -> Vote {
        Vote {
            option: VoteOption::CandidateA,
            identity_token: VisitorIdentity::new(token).unwrap(),
            network_address: NetworkAddress::new(ip),
            cast_at: Timestamp::from_millis(1),
        }
    }

    #[tokio::test]
    async fn append_then_find() {
        let ledger = NullLedger::new();
        ledger.append(&vote("t1", "198.51.100.4")).await.unwrap();
        let id = VisitorIdentity::new("t1").unwrap();
        assert_eq!(ledger.find_by_identity(&id).await.unwrap().len(), 1);
        assert_eq!(
            ledger.find_by_address(&NetworkAddress::new("198.51.100.4")).await.unwrap().len(),
            1
        );
        assert_eq!(ledger.append_count(), 1);
    }

    #[tokio::test]
    async fn unknown_address_never_matches() {
        let ledger = NullLedger::new();
        ledger.append(&vote("t1", "")).await.unwrap();
        assert!(ledger.find_by_address(&NetworkAddress::unknown()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_append_failures_are_consumed() {
        let ledger = NullLedger::new();
        ledger.fail_next_appends(1);
        assert!(matches!(
            ledger.append(&vote("t1", "")).await,
            Err(StoreError::Unavailable(_))
        ));
        ledger.append(&vote("t1", "")).await.unwrap();
        assert_eq!(ledger.records().len(), 1);
    }

    #[tokio::test]
    async fn reads_can_be_taken_down() {
        let ledger = NullLedger::new();
        ledger.set_reads_down(true);
        assert!(ledger.read_all().await.is_err());
        ledger.set_reads_down(false);
        assert!(ledger.read_all().await.unwrap().is_empty());
    }
}
