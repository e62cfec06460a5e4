//! ballot — command-line entry point for the poll.

mod verifier;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ballot_events::{EventSink, HttpEventSink, LogEventSink};
use ballot_gate::{GateError, HumanVerifier};
use ballot_identity::{FileTokenStorage, HttpAddressLookup, IdentityPersistence, IdentityResolver};
use ballot_poll::{render_tally, CastOutcome, Collaborators, PollConfig, PollSession};
use ballot_store_lmdb::environment::DEFAULT_MAP_SIZE;
use ballot_store_lmdb::integrity::{check_data_dir, check_integrity};
use ballot_store_lmdb::LmdbEnvironment;
use ballot_tally::TallyAggregator;
use ballot_types::{SystemClock, VoteOption};
use ballot_utils::{init_tracing, LogFormat};
use clap::Parser;

use crate::verifier::{ConsoleVerifier, StaticVerifier};

/// How long queued analytics events may take to flush on exit.
const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "ballot", about = "Single-question poll with one vote per visitor")]
struct Cli {
    /// Data directory for the ledger and the identity token.
    #[arg(long, env = "BALLOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Endpoint returning the caller's external IP address.
    #[arg(long, env = "BALLOT_ADDRESS_LOOKUP_URL")]
    address_lookup_url: Option<String>,

    /// Address lookup timeout in milliseconds.
    #[arg(long, env = "BALLOT_ADDRESS_LOOKUP_TIMEOUT_MS")]
    address_lookup_timeout_ms: Option<u64>,

    /// Analytics endpoint receiving poll events as JSON.
    #[arg(long, env = "BALLOT_ANALYTICS_URL")]
    analytics_url: Option<String>,

    /// Do not treat a vote from the same network address as a duplicate.
    #[arg(long, env = "BALLOT_IGNORE_ADDRESS")]
    ignore_address: bool,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show this visitor's identity, address and voting status.
    Status,
    /// Cast a vote: candidate-a, candidate-b or abstain.
    Vote {
        option: VoteOption,
        /// Verification token obtained elsewhere. Prompts on stdin if absent.
        #[arg(long, env = "BALLOT_VERIFICATION_TOKEN")]
        verification_token: Option<String>,
    },
    /// Show the current results.
    Tally,
}

impl Cli {
    /// Layer flags and env vars over the file config.
    fn merge_into(&self, file_cfg: PollConfig) -> PollConfig {
        PollConfig {
            data_dir: self.data_dir.clone().unwrap_or(file_cfg.data_dir),
            address_lookup_url: self
                .address_lookup_url
                .clone()
                .unwrap_or(file_cfg.address_lookup_url),
            address_lookup_timeout_ms: self
                .address_lookup_timeout_ms
                .unwrap_or(file_cfg.address_lookup_timeout_ms),
            analytics_url: self.analytics_url.clone().or(file_cfg.analytics_url),
            match_address: file_cfg.match_address && !self.ignore_address,
            log_format: self.log_format.clone().unwrap_or(file_cfg.log_format),
            log_level: self.log_level.clone().unwrap_or(file_cfg.log_level),
            ..file_cfg
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (file_config, config_problem) = match cli.config.as_ref() {
        Some(path) => match PollConfig::from_toml_file(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (PollConfig::default(), Some(format!("{}: {e}", path.display()))),
        },
        None => (PollConfig::default(), None),
    };
    let config = cli.merge_into(file_config);

    init_tracing(LogFormat::parse(&config.log_format), &config.log_level);
    match (&cli.config, config_problem) {
        (_, Some(problem)) => {
            tracing::warn!("Failed to load config file {problem}, using CLI defaults")
        }
        (Some(path), None) => tracing::info!("Loaded config from {}", path.display()),
        (None, None) => {}
    }

    let ledger_path = config.ledger_path();
    check_data_dir(&ledger_path).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&ledger_path, DEFAULT_MAP_SIZE)
        .with_context(|| format!("opening ledger at {}", ledger_path.display()))?;
    let report = check_integrity(&env)?;
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::error!("ledger integrity: {error}");
        }
        anyhow::bail!("ledger at {} failed integrity checks", ledger_path.display());
    }
    tracing::debug!(votes = report.vote_count, "ledger integrity ok");
    let ledger = Arc::new(env.vote_ledger());

    if let Command::Tally = cli.command {
        let tally = TallyAggregator::new()
            .refresh(ledger.as_ref())
            .await
            .context("reading the ledger")?;
        println!("{}", render_tally(&config, &tally));
        return Ok(());
    }

    let http_events = config
        .analytics_url
        .as_ref()
        .map(|url| Arc::new(HttpEventSink::spawn(url.clone())));
    let events: Arc<dyn EventSink> = match &http_events {
        Some(sink) => sink.clone(),
        None => Arc::new(LogEventSink),
    };
    let verifier: Arc<dyn HumanVerifier> = match &cli.command {
        Command::Vote {
            verification_token: Some(token),
            ..
        } => Arc::new(StaticVerifier::new(token.clone())),
        _ => Arc::new(ConsoleVerifier),
    };

    let resolver = IdentityResolver::new(
        Arc::new(FileTokenStorage::new(config.identity_path())),
        Arc::new(HttpAddressLookup::with_timeout(
            config.address_lookup_url.clone(),
            config.address_lookup_timeout(),
        )),
    );
    let collaborators = Collaborators {
        ledger,
        verifier,
        events,
        clock: Arc::new(SystemClock),
    };

    let result = run_session(&cli.command, &config, &resolver, collaborators).await;

    if let Some(sink) = http_events {
        sink.drain(EVENT_DRAIN_TIMEOUT).await;
    }
    result
}

async fn run_session(
    command: &Command,
    config: &PollConfig,
    resolver: &IdentityResolver,
    collaborators: Collaborators,
) -> anyhow::Result<()> {
    let session = match PollSession::open(resolver, config.duplicate_policy(), collaborators).await
    {
        Ok(session) => session,
        Err(e) => return report_gate_error(e),
    };

    match command {
        Command::Status => {
            let identity = session.identity();
            println!("identity: {}", identity.token);
            println!(
                "persistence: {}",
                match identity.persistence {
                    IdentityPersistence::Durable => "durable",
                    IdentityPersistence::SessionOnly => "session only",
                }
            );
            println!("address: {}", session.address());
            let state = session.state();
            println!("state: {state}");
            if !state.accepts_votes() {
                println!("{}", GateError::DuplicateVote.notice());
            }
            Ok(())
        }
        Command::Vote { option, .. } => match session.cast(*option).await {
            Ok(CastOutcome::Recorded { vote, tally }) => {
                println!(
                    "Thanks! Your vote for {} was recorded.",
                    config.labels.label(vote.option)
                );
                if let Some(tally) = tally {
                    println!();
                    println!("{}", render_tally(config, &tally));
                }
                Ok(())
            }
            Ok(CastOutcome::InFlight) => {
                println!("A vote is already being submitted.");
                Ok(())
            }
            Err(e) => report_gate_error(e),
        },
        Command::Tally => Ok(()),
    }
}

/// Print the visitor-facing notice. Only actionable errors fail the process.
fn report_gate_error(error: GateError) -> anyhow::Result<()> {
    println!("{}", error.notice());
    if error.is_actionable() {
        return Err(error.into());
    }
    Ok(())
}
