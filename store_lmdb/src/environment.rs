//! LMDB environment setup.

use crate::stake::LmdbStakeStore;
use crate::LmdbError;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;
use std::sync::Arc;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const LEDGERS_DB: &str = "ledgers";
const META_DB: &str = "meta";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    ledgers_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process and directory;
        // callers never open the same path twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(2)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let ledgers_db = env.create_database(&mut wtxn, Some(LEDGERS_DB))?;
        let meta_db = env.create_database(&mut wtxn, Some(META_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "lmdb environment opened");
        Ok(Self {
            env: Arc::new(env),
            ledgers_db,
            meta_db,
        })
    }

    /// A stake store backed by this environment.
    pub fn stake_store(&self) -> LmdbStakeStore {
        LmdbStakeStore::new(Arc::clone(&self.env), self.ledgers_db, self.meta_db)
    }
}
