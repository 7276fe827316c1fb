//! Per-account position history and staged changes.

use crate::error::VestingError;
use crate::position::StakePosition;
use serde::{Deserialize, Serialize};
use vestlock_types::Timestamp;

/// Append-only ordered positions for one account.
///
/// Positions are never removed; a drained position keeps its slot. Only the
/// most recent position is ever a merge target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    positions: Vec<StakePosition>,
}

/// A mutation computed against an [`AccountLedger`] but not yet applied.
///
/// Staging lets the caller run the external transfer between computing and
/// committing, so a failed transfer leaves the ledger untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerChange {
    /// Append a new position.
    Open(StakePosition),
    /// Replace the position at `index` with its merged form.
    Merge { index: usize, position: StakePosition },
    /// Reduce balances, as `(index, amount)` pairs in creation order.
    Withdraw(Vec<(usize, u128)>),
}

impl LedgerChange {
    /// Index of the position a deposit lands in, given the ledger it was planned on.
    pub fn target_index(&self, ledger: &AccountLedger) -> Option<usize> {
        match self {
            Self::Open(_) => Some(ledger.len()),
            Self::Merge { index, .. } => Some(*index),
            Self::Withdraw(_) => None,
        }
    }
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[StakePosition] {
        &self.positions
    }

    pub fn last(&self) -> Option<&StakePosition> {
        self.positions.last()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of balances across all positions.
    pub fn balance(&self) -> u128 {
        self.positions
            .iter()
            .fold(0u128, |acc, p| acc.saturating_add(p.balance))
    }

    /// Sum of withdrawable units across all positions.
    pub fn available(&self, now: Timestamp) -> u128 {
        self.positions
            .iter()
            .fold(0u128, |acc, p| acc.saturating_add(p.available(now)))
    }

    /// Plan a deposit: merge into the most recent position when `merge` is
    /// set and that position is still open, otherwise open a new position
    /// with `duration`.
    pub fn plan_deposit(
        &self,
        amount: u128,
        duration: u64,
        merge: bool,
        now: Timestamp,
    ) -> Result<LedgerChange, VestingError> {
        if merge {
            if let Some(last) = self.positions.last().filter(|p| p.is_open(now)) {
                return Ok(LedgerChange::Merge {
                    index: self.positions.len() - 1,
                    position: last.merged(amount, now)?,
                });
            }
        }
        Ok(LedgerChange::Open(StakePosition::new(amount, duration, now)))
    }

    /// Plan withdrawing `amount`, draining positions in creation order.
    pub fn plan_withdrawal(
        &self,
        amount: u128,
        now: Timestamp,
    ) -> Result<LedgerChange, VestingError> {
        let available = self.available(now);
        if amount > available {
            return Err(VestingError::AmountExceedsAvailable {
                requested: amount,
                available,
            });
        }
        let mut remaining = amount;
        let mut takes = Vec::new();
        for (index, position) in self.positions.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let take = position.available(now).min(remaining);
            if take > 0 {
                takes.push((index, take));
                remaining -= take;
            }
        }
        Ok(LedgerChange::Withdraw(takes))
    }

    /// Commit a change produced by one of the `plan_*` methods on this ledger.
    pub fn apply(&mut self, change: LedgerChange) {
        match change {
            LedgerChange::Open(position) => self.positions.push(position),
            LedgerChange::Merge { index, position } => self.positions[index] = position,
            LedgerChange::Withdraw(takes) => {
                for (index, take) in takes {
                    let position = &mut self.positions[index];
                    position.balance = position.balance.saturating_sub(take);
                }
            }
        }
    }
}
