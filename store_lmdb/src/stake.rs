use crate::LmdbError;
use heed::{types::Bytes, Database, Env};
use std::sync::Arc;
use vestlock_store::{StakeBatch, StakeStore, StoreError};
use vestlock_types::AccountId;

pub struct LmdbStakeStore {
    env: Arc<Env>,
    ledgers_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbStakeStore {
    pub fn new(
        env: Arc<Env>,
        ledgers_db: Database<Bytes, Bytes>,
        meta_db: Database<Bytes, Bytes>,
    ) -> Self {
        Self {
            env,
            ledgers_db,
            meta_db,
        }
    }

    fn get(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = db.get(&txn, key).map_err(LmdbError::from)?;
        Ok(value.map(<[u8]>::to_vec))
    }
}

impl StakeStore for LmdbStakeStore {
    fn get_account_ledger(&self, account: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        self.get(self.ledgers_db, account.as_str().as_bytes())
    }

    fn iter_account_ledgers(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        let txn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self.ledgers_db.iter(&txn).map_err(LmdbError::from)? {
            let (key, val) = item.map_err(LmdbError::from)?;
            let account = std::str::from_utf8(key)
                .map_err(|e| LmdbError::InvalidKey(e.to_string()))?;
            results.push((AccountId::new(account), val.to_vec()));
        }
        Ok(results)
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.get(self.meta_db, key)
    }

    /// One write transaction for the whole batch. An error on any put
    /// drops the transaction, which aborts it.
    fn commit(&self, batch: StakeBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut txn = self.env.write_txn().map_err(LmdbError::from)?;
        for (key, value) in batch.meta() {
            self.meta_db
                .put(&mut txn, key, value)
                .map_err(LmdbError::from)?;
        }
        for (account, ledger) in batch.ledgers() {
            self.ledgers_db
                .put(&mut txn, account.as_str().as_bytes(), ledger)
                .map_err(LmdbError::from)?;
        }
        txn.commit().map_err(LmdbError::from)?;
        tracing::trace!(writes = batch.len(), "stake batch committed");
        Ok(())
    }
}
