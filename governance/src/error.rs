use thiserror::Error;
use vestlock_types::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("NOT_OWNER: {caller} is not the governance owner")]
    NotOwner { caller: AccountId },

    #[error("BOUNDS_INVALID: require 0 < min ({min}) <= default ({default}) <= max ({max})")]
    InvalidBounds { min: u64, max: u64, default: u64 },

    #[error("DURATION_OUT_OF_BOUNDS: {duration}s is outside [{min}s, {max}s]")]
    DurationOutOfBounds { duration: u64, min: u64, max: u64 },
}

impl GovernanceError {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::InvalidBounds { .. } => "BOUNDS_INVALID",
            Self::DurationOutOfBounds { .. } => "DURATION_OUT_OF_BOUNDS",
        }
    }

    /// Whether the failure is a capability check rather than bad input.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotOwner { .. })
    }
}
