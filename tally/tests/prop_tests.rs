use proptest::prelude::*;

use ballot_store::LedgerRecord;
use ballot_tally::compute_tally;
use ballot_types::VoteOption;

/// Recognized options plus values a schemaless store could hold, including
/// near-misses of the wire form (lowercase, dashed, padded).
fn option_value() -> impl Strategy<Value = String> {
    let wire = || prop::sample::select(VoteOption::ALL.to_vec()).prop_map(|o| o.as_str().to_string());
    prop_oneof![
        4 => wire(),
        1 => "[A-Za-z_-]{0,12}",
        1 => wire().prop_map(|s| s.to_ascii_lowercase()),
        1 => wire().prop_map(|s| s.replace('_', "-")),
        1 => wire().prop_map(|s| format!(" {s} ")),
    ]
}

fn records() -> impl Strategy<Value = Vec<LedgerRecord>> {
    prop::collection::vec(
        (option_value(), "[0-9a-f]{8}").prop_map(|(option, vote_id)| LedgerRecord {
            option,
            ip: String::new(),
            vote_id,
            timestamp: String::new(),
        }),
        0..64,
    )
}

proptest! {
    /// Permuting the ledger never changes the tally.
    #[test]
    fn tally_is_order_independent(
        (original, shuffled) in records().prop_flat_map(|r| (Just(r.clone()), Just(r).prop_shuffle()))
    ) {
        prop_assert_eq!(compute_tally(&original), compute_tally(&shuffled));
    }

    /// Computing twice over the same records gives the same result.
    #[test]
    fn tally_is_idempotent(records in records()) {
        prop_assert_eq!(compute_tally(&records), compute_tally(&records));
    }

    /// Total = records minus those with unrecognized options.
    #[test]
    fn total_counts_recognized_records(records in records()) {
        let recognized = records
            .iter()
            .filter(|r| VoteOption::ALL.iter().any(|o| o.as_str() == r.option))
            .count() as u64;
        let tally = compute_tally(&records);
        prop_assert_eq!(tally.total(), recognized);
    }

    /// Per-option counts sum to the total.
    #[test]
    fn counts_sum_to_total(records in records()) {
        let tally = compute_tally(&records);
        let sum: u64 = tally.iter().map(|(_, c)| c).sum();
        prop_assert_eq!(sum, tally.total());
    }
}
