//! Poll configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ballot_store::DuplicatePolicy;
use ballot_types::VoteOption;

use crate::PollError;

/// Configuration for a ballot poll.
///
/// Can be loaded from a TOML file via [`PollConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollConfig {
    /// Data directory holding the ledger and the identity token.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the persisted identity token, relative to `data_dir`.
    #[serde(default = "default_identity_file")]
    pub identity_file: String,

    /// Endpoint returning the caller's external IP address.
    #[serde(default = "default_address_lookup_url")]
    pub address_lookup_url: String,

    /// Timeout for the address lookup in milliseconds.
    #[serde(default = "default_address_lookup_timeout_ms")]
    pub address_lookup_timeout_ms: u64,

    /// Analytics endpoint. Events are only logged when unset.
    #[serde(default)]
    pub analytics_url: Option<String>,

    /// Block visitors whose identity token already has a vote.
    #[serde(default = "default_true")]
    pub match_identity: bool,

    /// Block visitors whose network address already has a vote.
    #[serde(default = "default_true")]
    pub match_address: bool,

    /// The poll question.
    #[serde(default = "default_question")]
    pub question: String,

    /// Display labels for the options.
    #[serde(default)]
    pub labels: OptionLabels,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Human-readable label per option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLabels {
    #[serde(default = "default_candidate_a")]
    pub candidate_a: String,
    #[serde(default = "default_candidate_b")]
    pub candidate_b: String,
    #[serde(default = "default_abstain")]
    pub abstain: String,
}

impl OptionLabels {
    pub fn label(&self, option: VoteOption) -> &str {
        match option {
            VoteOption::CandidateA => &self.candidate_a,
            VoteOption::CandidateB => &self.candidate_b,
            VoteOption::Abstain => &self.abstain,
        }
    }
}

impl Default for OptionLabels {
    fn default() -> Self {
        Self {
            candidate_a: default_candidate_a(),
            candidate_b: default_candidate_b(),
            abstain: default_abstain(),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ballot_data")
}

fn default_identity_file() -> String {
    "identity_token".to_string()
}

fn default_address_lookup_url() -> String {
    "https://api.ipify.org?format=json".to_string()
}

fn default_address_lookup_timeout_ms() -> u64 {
    3_000
}

fn default_true() -> bool {
    true
}

fn default_question() -> String {
    "Who should win the election?".to_string()
}

fn default_candidate_a() -> String {
    "Candidate A".to_string()
}

fn default_candidate_b() -> String {
    "Candidate B".to_string()
}

fn default_abstain() -> String {
    "Abstain".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PollConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PollError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PollError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PollError> {
        toml::from_str(s).map_err(|e| PollError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("PollConfig is always serializable to TOML")
    }

    /// Where the identity token lives.
    pub fn identity_path(&self) -> PathBuf {
        self.data_dir.join(&self.identity_file)
    }

    /// Where the LMDB ledger lives.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger")
    }

    pub fn address_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.address_lookup_timeout_ms)
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        DuplicatePolicy {
            match_identity: self.match_identity,
            match_address: self.match_address,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            identity_file: default_identity_file(),
            address_lookup_url: default_address_lookup_url(),
            address_lookup_timeout_ms: default_address_lookup_timeout_ms(),
            analytics_url: None,
            match_identity: default_true(),
            match_address: default_true(),
            question: default_question(),
            labels: OptionLabels::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = PollConfig {
            analytics_url: Some("https://events.example.org/poll".into()),
            ..PollConfig::default()
        };
        let toml_str = config.to_toml_string();
        let parsed = PollConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.address_lookup_url, config.address_lookup_url);
        assert_eq!(parsed.analytics_url, config.analytics_url);
        assert_eq!(parsed.labels, config.labels);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = PollConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.address_lookup_timeout_ms, 3_000);
        assert!(config.match_identity);
        assert!(config.match_address);
        assert_eq!(config.analytics_url, None);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            question = "Best editor?"
            match_address = false

            [labels]
            candidate_a = "vim"
        "#;
        let config = PollConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.question, "Best editor?");
        assert_eq!(config.labels.label(VoteOption::CandidateA), "vim");
        assert_eq!(config.labels.label(VoteOption::Abstain), "Abstain"); // default
        assert_eq!(
            config.duplicate_policy(),
            DuplicatePolicy {
                match_identity: true,
                match_address: false,
            }
        );
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = PollConfig::from_toml_str("match_identity = \"yes\"").unwrap_err();
        assert!(matches!(err, PollError::Config(_)));
    }

    #[test]
    fn paths_are_under_data_dir() {
        let config = PollConfig {
            data_dir: PathBuf::from("/var/lib/ballot"),
            ..PollConfig::default()
        };
        assert_eq!(config.identity_path(), PathBuf::from("/var/lib/ballot/identity_token"));
        assert_eq!(config.ledger_path(), PathBuf::from("/var/lib/ballot/ledger"));
    }

    #[test]
    fn from_toml_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ballot.toml");
        std::fs::write(&path, "address_lookup_timeout_ms = 250\n").unwrap();
        let config = PollConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.address_lookup_timeout(), Duration::from_millis(250));
        assert!(PollConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
