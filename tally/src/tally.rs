//! Per-option counts.

use ballot_store::LedgerRecord;
use ballot_types::VoteOption;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts per option plus the grand total.
///
/// Every option in [`VoteOption::ALL`] is present, with zero if unvoted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    counts: BTreeMap<VoteOption, u64>,
    total: u64,
}

impl VoteTally {
    /// A tally with every option at zero.
    pub fn empty() -> Self {
        Self {
            counts: VoteOption::ALL.into_iter().map(|o| (o, 0)).collect(),
            total: 0,
        }
    }

    pub fn count(&self, option: VoteOption) -> u64 {
        self.counts.get(&option).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Options with their counts, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (VoteOption, u64)> + '_ {
        self.counts.iter().map(|(o, c)| (*o, *c))
    }

    /// Percentage of the total cast for `option`, 0 when nothing was cast.
    pub fn share(&self, option: VoteOption) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(option) as f64 * 100.0 / self.total as f64
    }
}

impl Default for VoteTally {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reduce ledger records to a tally.
///
/// Records whose `option` is not a recognized [`VoteOption`] are skipped, so
/// the total equals the number of records with a recognized option.
pub fn compute_tally<'a>(records: impl IntoIterator<Item = &'a LedgerRecord>) -> VoteTally {
    let mut tally = VoteTally::empty();
    let mut skipped = 0usize;
    for record in records {
        match record.vote_option() {
            Ok(option) => {
                *tally.counts.entry(option).or_insert(0) += 1;
                tally.total += 1;
            }
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "ignored ledger records with unrecognized options");
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(option: &str) -> LedgerRecord {
        LedgerRecord {
            option: option.to_string(),
            ip: String::new(),
            vote_id: "t".to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn empty_ledger_has_all_options_at_zero() {
        let tally = compute_tally(&Vec::<LedgerRecord>::new());
        assert_eq!(tally.total(), 0);
        for option in VoteOption::ALL {
            assert_eq!(tally.count(option), 0);
            assert_eq!(tally.share(option), 0.0);
        }
        assert_eq!(tally.iter().count(), VoteOption::ALL.len());
    }

    #[test]
    fn counts_per_option() {
        let records = [record("CANDIDATE_A"), record("CANDIDATE_B"), record("CANDIDATE_A")];
        let tally = compute_tally(&records);
        assert_eq!(tally.count(VoteOption::CandidateA), 2);
        assert_eq!(tally.count(VoteOption::CandidateB), 1);
        assert_eq!(tally.count(VoteOption::Abstain), 0);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn malformed_options_are_skipped() {
        let records = [record("CANDIDATE_A"), record("WRITE_IN"), record(""), record("ABSTAIN")];
        let tally = compute_tally(&records);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.count(VoteOption::Abstain), 1);
    }

    #[test]
    fn only_exact_wire_form_is_counted() {
        let records = [record("candidate-a"), record(" ABSTAIN "), record("Candidate_B")];
        let tally = compute_tally(&records);
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.iter().map(|(_, c)| c).sum::<u64>(), 0);
    }

    #[test]
    fn share_is_percentage_of_total() {
        let records = [record("CANDIDATE_A"), record("CANDIDATE_B"), record("CANDIDATE_B"), record("CANDIDATE_B")];
        let tally = compute_tally(&records);
        assert_eq!(tally.share(VoteOption::CandidateA), 25.0);
        assert_eq!(tally.share(VoteOption::CandidateB), 75.0);
    }

    #[test]
    fn iter_is_in_display_order() {
        let order: Vec<_> = VoteTally::empty().iter().map(|(o, _)| o).collect();
        assert_eq!(order, VoteOption::ALL.to_vec());
    }
}
