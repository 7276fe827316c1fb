use crate::StoreError;
use vestlock_types::AccountId;

/// Store trait for persisting ledger state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `vestlock-vesting`
/// crate. The ledger serializes/deserializes its own types.
///
/// Writes go through [`StakeBatch`]: a committed batch lands in full or not
/// at all.
pub trait StakeStore {
    fn get_account_ledger(&self, account: &AccountId) -> Result<Option<Vec<u8>>, StoreError>;
    fn iter_account_ledgers(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError>;
    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Apply every write in `batch` atomically.
    fn commit(&self, batch: StakeBatch) -> Result<(), StoreError>;
}

/// A set of pending writes committed together by [`StakeStore::commit`].
///
/// ```ignore
/// let mut batch = StakeBatch::new();
/// batch.put_meta(meta_keys::GOVERNANCE, &governance);
/// batch.put_account_ledger(&account, &ledger);
/// store.commit(batch)?;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakeBatch {
    ledgers: Vec<(AccountId, Vec<u8>)>,
    meta: Vec<(Vec<u8>, Vec<u8>)>,
}

impl StakeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_account_ledger(&mut self, account: &AccountId, ledger: &[u8]) {
        self.ledgers.push((account.clone(), ledger.to_vec()));
    }

    pub fn put_meta(&mut self, key: &[u8], value: &[u8]) {
        self.meta.push((key.to_vec(), value.to_vec()));
    }

    /// Account ledger writes in insertion order.
    pub fn ledgers(&self) -> &[(AccountId, Vec<u8>)] {
        &self.ledgers
    }

    /// Meta writes in insertion order.
    pub fn meta(&self) -> &[(Vec<u8>, Vec<u8>)] {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.ledgers.len() + self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty() && self.meta.is_empty()
    }
}

/// Well-known meta keys.
pub mod meta_keys {
    pub const GOVERNANCE: &[u8] = b"governance";
    pub const DELEGATION: &[u8] = b"delegation";
}
