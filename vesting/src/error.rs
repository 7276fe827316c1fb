//! Ledger errors and their taxonomy.

use thiserror::Error;
use vestlock_delegation::DelegationError;
use vestlock_gateway::GatewayError;
use vestlock_governance::GovernanceError;
use vestlock_types::AccountId;

/// Coarse classification callers can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was malformed or not permitted by ledger state.
    Validation,
    /// The caller lacks the capability for the operation.
    Authorization,
    /// The asset gateway refused or failed the transfer.
    ExternalTransfer,
    /// Arithmetic or storage failure inside the ledger.
    Internal,
}

#[derive(Debug, Error)]
pub enum VestingError {
    #[error("AMOUNT_INVALID: amount must be greater than zero")]
    AmountInvalid,

    #[error("NOT_STAKED: {0} has no stake positions")]
    NotStaked(AccountId),

    #[error("AMOUNT_EXCEEDS_AVAILABLE: requested {requested}, available {available}")]
    AmountExceedsAvailable { requested: u128, available: u128 },

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Delegation(#[from] DelegationError),

    #[error(transparent)]
    Transfer(#[from] GatewayError),

    #[error("arithmetic overflow in vesting computation")]
    Overflow,

    #[error("storage error: {0}")]
    Store(String),
}

impl VestingError {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AmountInvalid => "AMOUNT_INVALID",
            Self::NotStaked(_) => "NOT_STAKED",
            Self::AmountExceedsAvailable { .. } => "AMOUNT_EXCEEDS_AVAILABLE",
            Self::Governance(e) => e.code(),
            Self::Delegation(e) => e.code(),
            Self::Transfer(_) => "TRANSFER_FAILED",
            Self::Overflow => "OVERFLOW",
            Self::Store(_) => "STORE_FAILED",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::AmountInvalid | Self::NotStaked(_) | Self::AmountExceedsAvailable { .. } => {
                ErrorClass::Validation
            }
            Self::Governance(e) if e.is_authorization() => ErrorClass::Authorization,
            Self::Governance(_) => ErrorClass::Validation,
            Self::Delegation(DelegationError::Snapshot(_)) => ErrorClass::Internal,
            Self::Delegation(_) => ErrorClass::Validation,
            Self::Transfer(_) => ErrorClass::ExternalTransfer,
            Self::Overflow | Self::Store(_) => ErrorClass::Internal,
        }
    }
}

impl From<vestlock_store::StoreError> for VestingError {
    fn from(e: vestlock_store::StoreError) -> Self {
        Self::Store(e.to_string())
    }
}
