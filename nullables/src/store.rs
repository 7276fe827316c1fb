//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use vestlock_store::{StakeBatch, StakeStore, StoreError};
use vestlock_types::AccountId;

/// An in-memory stake store for testing.
///
/// A batch is applied under both locks, so readers never observe half of
/// one. [`Self::fail_with`] makes every commit fail before anything is
/// written.
pub struct NullStakeStore {
    ledgers: Mutex<HashMap<AccountId, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    failure: Mutex<Option<String>>,
    ledger_writes: Mutex<usize>,
}

impl NullStakeStore {
    pub fn new() -> Self {
        Self {
            ledgers: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            ledger_writes: Mutex::new(0),
        }
    }

    pub fn ledger_count(&self) -> usize {
        self.ledgers.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Account ledger writes committed so far, counting overwrites.
    pub fn ledger_writes(&self) -> usize {
        self.ledger_writes.lock().map(|n| *n).unwrap_or(0)
    }

    /// Fail every subsequent commit with `reason` until [`Self::clear_failure`].
    pub fn fail_with(&self, reason: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(reason.into());
        }
    }

    pub fn clear_failure(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }
}

impl Default for NullStakeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl StakeStore for NullStakeStore {
    fn get_account_ledger(&self, account: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.ledgers.lock().map_err(poisoned)?.get(account).cloned())
    }

    fn iter_account_ledgers(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        Ok(self
            .ledgers
            .lock()
            .map_err(poisoned)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn commit(&self, batch: StakeBatch) -> Result<(), StoreError> {
        if let Some(reason) = self.failure.lock().map_err(poisoned)?.clone() {
            return Err(StoreError::Backend(reason));
        }
        let mut ledgers = self.ledgers.lock().map_err(poisoned)?;
        let mut meta = self.meta.lock().map_err(poisoned)?;
        let mut writes = self.ledger_writes.lock().map_err(poisoned)?;
        for (key, value) in batch.meta() {
            meta.insert(key.clone(), value.clone());
        }
        for (account, ledger) in batch.ledgers() {
            ledgers.insert(account.clone(), ledger.clone());
        }
        *writes += batch.ledgers().len();
        Ok(())
    }
}
