//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::ledger::LmdbVoteLedger;
use crate::LmdbError;

/// Vote documents keyed by a big-endian `u64` sequence number.
pub(crate) const VOTES_DB: &str = "votes";
/// `voteID ++ 0x00 ++ seq` → empty.
pub(crate) const VOTES_BY_IDENTITY_DB: &str = "votes_by_identity";
/// `IP ++ 0x00 ++ seq` → empty.
pub(crate) const VOTES_BY_ADDRESS_DB: &str = "votes_by_address";

/// Default map size: 256 MiB is far beyond what a single poll needs.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    path: PathBuf,
    env: Arc<Env>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) by_identity_db: Database<Bytes, Bytes>,
    pub(crate) by_address_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment directory is owned by this process; callers
        // must not open the same path twice within one process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(3)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let votes_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some(VOTES_DB))?;
        let by_identity_db =
            env.create_database::<Bytes, Bytes>(&mut wtxn, Some(VOTES_BY_IDENTITY_DB))?;
        let by_address_db =
            env.create_database::<Bytes, Bytes>(&mut wtxn, Some(VOTES_BY_ADDRESS_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), "opened LMDB ledger environment");

        Ok(Self {
            path: path.to_path_buf(),
            env: Arc::new(env),
            votes_db,
            by_identity_db,
            by_address_db,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// A ledger handle sharing this environment.
    pub fn vote_ledger(&self) -> LmdbVoteLedger {
        LmdbVoteLedger {
            env: Arc::clone(&self.env),
            votes_db: self.votes_db,
            by_identity_db: self.by_identity_db,
            by_address_db: self.by_address_db,
        }
    }
}
