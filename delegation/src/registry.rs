//! The account ↔ delegate bijection.

use crate::error::DelegationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vestlock_types::AccountId;

/// Maintains both directions of every delegation link.
///
/// Invariant: `delegates[a] == d` iff `accounts[d] == a`.
#[derive(Clone, Debug, Default)]
pub struct DelegationRegistry {
    /// account → delegate.
    delegates: BTreeMap<AccountId, AccountId>,
    /// Reverse index: delegate → account.
    accounts: BTreeMap<AccountId, AccountId>,
}

/// Serializable form of the registry. Only the forward map is stored; the
/// reverse index is rebuilt on load.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationSnapshot {
    pub links: Vec<(AccountId, AccountId)>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `account` to `delegate`.
    pub fn add_delegate(
        &mut self,
        account: &AccountId,
        delegate: &AccountId,
    ) -> Result<(), DelegationError> {
        if account == delegate {
            return Err(DelegationError::SelfDelegation(account.clone()));
        }
        if let Some(existing) = self.delegates.get(account) {
            return Err(DelegationError::AccountHasDelegate {
                account: account.clone(),
                delegate: existing.clone(),
            });
        }
        if let Some(represented) = self.accounts.get(delegate) {
            return Err(DelegationError::DelegateTaken {
                delegate: delegate.clone(),
                account: represented.clone(),
            });
        }
        self.delegates.insert(account.clone(), delegate.clone());
        self.accounts.insert(delegate.clone(), account.clone());
        tracing::debug!(%account, %delegate, "delegation link added");
        Ok(())
    }

    /// Remove the link between `account` and `delegate`.
    pub fn remove_delegate(
        &mut self,
        account: &AccountId,
        delegate: &AccountId,
    ) -> Result<(), DelegationError> {
        if self.delegates.get(account) != Some(delegate) {
            return Err(DelegationError::LinkMismatch {
                account: account.clone(),
                delegate: delegate.clone(),
            });
        }
        self.delegates.remove(account);
        self.accounts.remove(delegate);
        tracing::debug!(%account, %delegate, "delegation link removed");
        Ok(())
    }

    /// The account whose ledger entries `caller` acts on.
    pub fn resolve(&self, caller: &AccountId) -> AccountId {
        self.accounts
            .get(caller)
            .cloned()
            .unwrap_or_else(|| caller.clone())
    }

    /// Whether `address` currently represents some account.
    pub fn is_delegate(&self, address: &AccountId) -> bool {
        self.accounts.contains_key(address)
    }

    /// The delegate registered by `account`, if any.
    pub fn delegate_of(&self, account: &AccountId) -> Option<&AccountId> {
        self.delegates.get(account)
    }

    /// The account `delegate` represents, if any.
    pub fn account_of(&self, delegate: &AccountId) -> Option<&AccountId> {
        self.accounts.get(delegate)
    }

    /// All links as `(account, delegate)` pairs, ordered by account.
    pub fn links(&self) -> impl Iterator<Item = (&AccountId, &AccountId)> {
        self.delegates.iter()
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    pub fn snapshot(&self) -> DelegationSnapshot {
        DelegationSnapshot {
            links: self
                .delegates
                .iter()
                .map(|(a, d)| (a.clone(), d.clone()))
                .collect(),
        }
    }

    /// Rebuild a registry from a snapshot, re-checking the bijection.
    pub fn from_snapshot(snapshot: DelegationSnapshot) -> Result<Self, DelegationError> {
        let mut registry = Self::new();
        for (account, delegate) in &snapshot.links {
            registry
                .add_delegate(account, delegate)
                .map_err(|e| DelegationError::Snapshot(e.to_string()))?;
        }
        Ok(registry)
    }

    /// Serialize the registry to bytes for persistence.
    pub fn save_state(&self) -> Result<Vec<u8>, DelegationError> {
        bincode::serialize(&self.snapshot()).map_err(|e| DelegationError::Snapshot(e.to_string()))
    }

    /// Restore the registry from serialized bytes.
    pub fn load_state(data: &[u8]) -> Result<Self, DelegationError> {
        let snapshot: DelegationSnapshot =
            bincode::deserialize(data).map_err(|e| DelegationError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}
