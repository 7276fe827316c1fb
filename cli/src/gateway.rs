//! Journal gateway for operator-driven custody.

use vestlock_gateway::{AssetGateway, GatewayError, TransferDirection};
use vestlock_types::AccountId;

/// Records every requested transfer and lets it succeed.
///
/// Custody is settled out of band by the operator, who reads the journal
/// from the structured log.
#[derive(Debug, Default)]
pub struct JournalGateway {
    entries: Vec<(TransferDirection, AccountId, u128)>,
}

impl JournalGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(TransferDirection, AccountId, u128)] {
        &self.entries
    }

    fn record(&mut self, direction: TransferDirection, holder: &AccountId, amount: u128) {
        tracing::info!(?direction, %holder, %amount, "custody transfer");
        self.entries.push((direction, holder.clone(), amount));
    }
}

impl AssetGateway for JournalGateway {
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.record(TransferDirection::In, from, amount);
        Ok(())
    }

    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError> {
        self.record(TransferDirection::Out, to, amount);
        Ok(())
    }
}
