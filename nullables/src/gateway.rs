//! Nullable asset gateway — in-memory custody with scripted failures.

use std::collections::HashMap;
use vestlock_gateway::{AssetGateway, GatewayError, TransferDirection};
use vestlock_types::AccountId;

/// An in-memory [`AssetGateway`] that journals every successful transfer.
///
/// In strict mode (`new`) holders must be funded before they can pay in and
/// a missing balance fails with `"Insufficient Funds"`. In permissive mode
/// every inbound transfer succeeds regardless of holder balance.
#[derive(Debug, Default)]
pub struct NullGateway {
    balances: HashMap<AccountId, u128>,
    custody: u128,
    permissive: bool,
    failure: Option<String>,
    transfers: Vec<(TransferDirection, AccountId, u128)>,
}

impl NullGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Credit an external holder with spendable units.
    pub fn fund(&mut self, holder: &AccountId, amount: u128) {
        let balance = self.balances.entry(holder.clone()).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Fail every subsequent transfer with `reason` until [`Self::clear_failure`].
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    /// External balance of a holder.
    pub fn balance_of(&self, holder: &AccountId) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Units currently held in ledger custody.
    pub fn custody(&self) -> u128 {
        self.custody
    }

    /// Successful transfers, oldest first.
    pub fn transfers(&self) -> &[(TransferDirection, AccountId, u128)] {
        &self.transfers
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        match &self.failure {
            Some(reason) => Err(GatewayError::new(reason.clone())),
            None => Ok(()),
        }
    }
}

impl AssetGateway for NullGateway {
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.check_failure()?;
        if !self.permissive {
            let balance = self.balance_of(from);
            if balance < amount {
                return Err(GatewayError::new("Insufficient Funds"));
            }
            self.balances.insert(from.clone(), balance - amount);
        }
        self.custody = self.custody.saturating_add(amount);
        self.transfers
            .push((TransferDirection::In, from.clone(), amount));
        Ok(())
    }

    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.check_failure()?;
        if !self.permissive && self.custody < amount {
            return Err(GatewayError::new("Insufficient Custody"));
        }
        self.custody = self.custody.saturating_sub(amount);
        self.fund(to, amount);
        self.transfers
            .push((TransferDirection::Out, to.clone(), amount));
        Ok(())
    }
}
