//! A single deposit batch and its vesting schedule.

use crate::error::VestingError;
use crate::math::{merged_origin, vested_amount};
use serde::{Deserialize, Serialize};
use vestlock_types::Timestamp;

/// One stake position.
///
/// `OPEN` while `now - origin < duration`, `FULLY_VESTED` afterwards. The
/// state is derived from time on every read and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Units still held (deposits minus withdrawals).
    pub balance: u128,
    /// Units ever deposited into this position.
    pub deposited: u128,
    /// Vesting length in seconds, fixed at creation.
    pub duration: u64,
    /// Vesting clock anchor.
    pub origin: Timestamp,
}

impl StakePosition {
    pub fn new(amount: u128, duration: u64, now: Timestamp) -> Self {
        Self {
            balance: amount,
            deposited: amount,
            duration,
            origin: now,
        }
    }

    pub fn elapsed(&self, now: Timestamp) -> u64 {
        self.origin.elapsed_since(now)
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        self.elapsed(now) < self.duration
    }

    pub fn is_fully_vested(&self, now: Timestamp) -> bool {
        !self.is_open(now)
    }

    /// Units already withdrawn from this position.
    pub fn withdrawn(&self) -> u128 {
        self.deposited.saturating_sub(self.balance)
    }

    /// Units that may be withdrawn right now.
    ///
    /// Vesting accrues on everything ever deposited; what has already been
    /// withdrawn is subtracted, so a withdrawal never lets the same vested
    /// units be claimed twice.
    pub fn available(&self, now: Timestamp) -> u128 {
        if self.is_fully_vested(now) {
            return self.balance;
        }
        vested_amount(self.deposited, self.elapsed(now), self.duration)
            .saturating_sub(self.withdrawn())
            .min(self.balance)
    }

    /// This position after merging `amount` more units at `now`.
    pub fn merged(&self, amount: u128, now: Timestamp) -> Result<Self, VestingError> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(VestingError::Overflow)?;
        let deposited = self
            .deposited
            .checked_add(amount)
            .ok_or(VestingError::Overflow)?;
        let origin =
            merged_origin(self.origin, self.balance, amount, now).ok_or(VestingError::Overflow)?;
        Ok(Self {
            balance,
            deposited,
            duration: self.duration,
            origin,
        })
    }
}
