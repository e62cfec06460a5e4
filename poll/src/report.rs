//! Plain-text rendering of a tally.

use crate::PollConfig;
use ballot_tally::VoteTally;
use std::fmt::Write;

/// The question, one line per option with count and share, and the total.
pub fn render_tally(config: &PollConfig, tally: &VoteTally) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", config.question);
    for (option, count) in tally.iter() {
        let _ = writeln!(
            out,
            "  {:<16} {:>6}  {:>5.1}%",
            config.labels.label(option),
            count,
            tally.share(option)
        );
    }
    let _ = write!(out, "  {:<16} {:>6}", "Total", tally.total());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_store::LedgerRecord;
    use ballot_tally::compute_tally;

    fn record(option: &str) -> LedgerRecord {
        LedgerRecord {
            option: option.to_string(),
            ip: String::new(),
            vote_id: "v".to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn renders_every_option_and_total() {
        let tally = compute_tally(&[record("CANDIDATE_A"), record("ABSTAIN")]);
        let text = render_tally(&PollConfig::default(), &tally);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Who should win the election?");
        assert!(lines[1].contains("Candidate A") && lines[1].contains("50.0%"));
        assert!(lines[2].contains("Candidate B") && lines[2].contains("0.0%"));
        assert!(lines[3].contains("Abstain"));
        assert!(lines[4].contains("Total") && lines[4].ends_with('2'));
    }

    #[test]
    fn empty_tally_renders_zero_shares() {
        let text = render_tally(&PollConfig::default(), &VoteTally::empty());
        assert_eq!(text.matches("0.0%").count(), 3);
    }
}
