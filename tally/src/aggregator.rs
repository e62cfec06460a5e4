//! Recomputes the tally from a ledger.

use crate::{compute_tally, VoteTally};
use ballot_store::{StoreError, VoteLedger};

/// Reads the full ledger and reduces it. Holds no state: every refresh
/// reflects the ledger at read time.
#[derive(Clone, Copy, Debug, Default)]
pub struct TallyAggregator;

impl TallyAggregator {
    pub fn new() -> Self {
        Self
    }

    pub async fn refresh(&self, ledger: &dyn VoteLedger) -> Result<VoteTally, StoreError> {
        let records = ledger.read_all().await?;
        let tally = compute_tally(&records);
        tracing::debug!(records = records.len(), total = tally.total(), "tally recomputed");
        Ok(tally)
    }
}
