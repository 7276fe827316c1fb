use thiserror::Error;
use vestlock_types::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DelegationError {
    #[error("SENDER_HAS_DELEGATE: {account} already has delegate {delegate}")]
    AccountHasDelegate { account: AccountId, delegate: AccountId },

    #[error("DELEGATE_TAKEN: {delegate} already represents {account}")]
    DelegateTaken { delegate: AccountId, account: AccountId },

    #[error("DELEGATE_INVALID: {0} cannot delegate to itself")]
    SelfDelegation(AccountId),

    #[error("DELEGATE_MISMATCH: {delegate} is not the delegate of {account}")]
    LinkMismatch { account: AccountId, delegate: AccountId },

    #[error("delegation snapshot error: {0}")]
    Snapshot(String),
}

impl DelegationError {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountHasDelegate { .. } => "SENDER_HAS_DELEGATE",
            Self::DelegateTaken { .. } => "DELEGATE_TAKEN",
            Self::SelfDelegation(_) => "DELEGATE_INVALID",
            Self::LinkMismatch { .. } => "DELEGATE_MISMATCH",
            Self::Snapshot(_) => "SNAPSHOT_INVALID",
        }
    }
}
