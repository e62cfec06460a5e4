//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before any vote is gated
//! against the ledger.

use std::path::Path;

use heed::types::Bytes;

use crate::environment::{VOTES_BY_ADDRESS_DB, VOTES_BY_IDENTITY_DB, VOTES_DB};
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub vote_count: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check ledger integrity on startup.
///
/// Every vote has exactly one identity index entry, so the two counts must
/// agree. The address index may be smaller (unknown addresses are not
/// indexed) but never larger. Read failures are recorded in the report
/// rather than causing a hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        databases_checked: 0,
        vote_count: 0,
        errors: Vec::new(),
    };

    let rtxn = env.env().read_txn()?;
    let mut counts = [0u64; 3];

    for (i, db_name) in [VOTES_DB, VOTES_BY_IDENTITY_DB, VOTES_BY_ADDRESS_DB]
        .into_iter()
        .enumerate()
    {
        match env.env().open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => counts[i] = count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{db_name}': {e}")),
                }
            }
            Ok(None) => report.errors.push(format!("database '{db_name}' is missing")),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{db_name}': {e}")),
        }
    }

    let [votes, by_identity, by_address] = counts;
    report.vote_count = votes;
    if by_identity != votes {
        report.errors.push(format!(
            "identity index has {by_identity} entries for {votes} votes"
        ));
    }
    if by_address > votes {
        report.errors.push(format!(
            "address index has {by_address} entries for {votes} votes"
        ));
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
