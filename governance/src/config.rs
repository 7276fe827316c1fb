//! The governance record and its owner-gated mutators.

use crate::error::GovernanceError;
use crate::params::GovernableParam;
use serde::{Deserialize, Serialize};
use vestlock_types::params::validate_bounds;
use vestlock_types::{AccountId, VestingParams};

/// Owner-controlled parameters bounding new positions.
///
/// Invariant: `0 < min_duration <= default_duration <= max_duration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    owner: AccountId,
    min_duration: u64,
    max_duration: u64,
    default_duration: u64,
    name: String,
    symbol: String,
}

impl GovernanceConfig {
    /// Create the governance record for `owner`, seeded from `params`.
    pub fn new(owner: AccountId, params: &VestingParams) -> Result<Self, GovernanceError> {
        validate_bounds(
            params.min_duration_secs,
            params.max_duration_secs,
            params.default_duration_secs,
        )
        .map_err(|_| GovernanceError::InvalidBounds {
            min: params.min_duration_secs,
            max: params.max_duration_secs,
            default: params.default_duration_secs,
        })?;
        Ok(Self {
            owner,
            min_duration: params.min_duration_secs,
            max_duration: params.max_duration_secs,
            default_duration: params.default_duration_secs,
            name: params.name.clone(),
            symbol: params.symbol.clone(),
        })
    }

    /// Re-check the bound ordering, e.g. after loading a persisted record.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        validate_bounds(self.min_duration, self.max_duration, self.default_duration).map_err(
            |_| GovernanceError::InvalidBounds {
                min: self.min_duration,
                max: self.max_duration,
                default: self.default_duration,
            },
        )
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        if caller != &self.owner {
            return Err(GovernanceError::NotOwner {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Replace all three duration bounds at once.
    ///
    /// Returns the parameters whose values actually changed.
    pub fn set_bounds(
        &mut self,
        caller: &AccountId,
        min: u64,
        max: u64,
        default: u64,
    ) -> Result<Vec<GovernableParam>, GovernanceError> {
        self.ensure_owner(caller)?;
        validate_bounds(min, max, default)
            .map_err(|_| GovernanceError::InvalidBounds { min, max, default })?;

        let mut changed = Vec::new();
        if self.min_duration != min {
            changed.push(GovernableParam::MinDuration);
        }
        if self.max_duration != max {
            changed.push(GovernableParam::MaxDuration);
        }
        if self.default_duration != default {
            changed.push(GovernableParam::DefaultDuration);
        }
        self.min_duration = min;
        self.max_duration = max;
        self.default_duration = default;

        for param in &changed {
            tracing::info!(param = param.name(), min, max, default, "governance bound updated");
        }
        Ok(changed)
    }

    /// Replace the descriptive name and symbol.
    pub fn set_metadata(
        &mut self,
        caller: &AccountId,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Vec<GovernableParam>, GovernanceError> {
        self.ensure_owner(caller)?;
        let (name, symbol) = (name.into(), symbol.into());
        let mut changed = Vec::new();
        if self.name != name {
            changed.push(GovernableParam::Name);
        }
        if self.symbol != symbol {
            changed.push(GovernableParam::Symbol);
        }
        tracing::info!(%name, %symbol, "governance metadata updated");
        self.name = name;
        self.symbol = symbol;
        Ok(changed)
    }

    /// Check a requested duration for a new position against the current bounds.
    pub fn check_duration(&self, duration: u64) -> Result<(), GovernanceError> {
        if duration < self.min_duration || duration > self.max_duration {
            return Err(GovernanceError::DurationOutOfBounds {
                duration,
                min: self.min_duration,
                max: self.max_duration,
            });
        }
        Ok(())
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn min_duration(&self) -> u64 {
        self.min_duration
    }

    pub fn max_duration(&self) -> u64 {
        self.max_duration
    }

    pub fn default_duration(&self) -> u64 {
        self.default_duration
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}
