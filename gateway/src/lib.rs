//! Asset custody gateway.
//!
//! The ledger never moves asset units itself. It asks an [`AssetGateway`] to
//! pull units into custody or push them back out, and treats each call as a
//! single all-or-nothing outcome.

use thiserror::Error;
use vestlock_types::AccountId;

/// A failed transfer, carrying the gateway's reason verbatim.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct GatewayError {
    pub reason: String,
}

impl GatewayError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Direction of a custody transfer, used for journaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    /// From an external holder into ledger custody.
    In,
    /// From ledger custody back to an external holder.
    Out,
}

/// Moves asset units between external holders and ledger custody.
///
/// Implementations must be atomic: either the full amount moves and `Ok(())`
/// is returned, or nothing moves and an error is returned.
pub trait AssetGateway {
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError>;
    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError>;

    /// Dispatch on a [`TransferDirection`].
    fn transfer(
        &mut self,
        direction: TransferDirection,
        holder: &AccountId,
        amount: u128,
    ) -> Result<(), GatewayError> {
        match direction {
            TransferDirection::In => self.transfer_in(holder, amount),
            TransferDirection::Out => self.transfer_out(holder, amount),
        }
    }
}

impl<G: AssetGateway + ?Sized> AssetGateway for &mut G {
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), GatewayError> {
        (**self).transfer_in(from, amount)
    }

    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), GatewayError> {
        (**self).transfer_out(to, amount)
    }
}
