//! Default governance parameters for a freshly created ledger.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};

const DAY_SECS: u64 = 86_400;

/// Vesting bounds and descriptive metadata a ledger starts with.
///
/// After construction every field is owner-governable; these are only the
/// values the governance record is seeded from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VestingParams {
    /// Shortest vesting duration (seconds) a new position may use.
    pub min_duration_secs: u64,

    /// Longest vesting duration (seconds) a new position may use.
    pub max_duration_secs: u64,

    /// Duration used when a stake call does not name one.
    pub default_duration_secs: u64,

    /// Descriptive name of the staked position token.
    pub name: String,

    /// Descriptive ticker symbol.
    pub symbol: String,
}

impl VestingParams {
    /// Check `0 < min <= default <= max`.
    pub fn validate(&self) -> Result<(), TypesError> {
        validate_bounds(
            self.min_duration_secs,
            self.max_duration_secs,
            self.default_duration_secs,
        )
    }
}

/// Check the duration ordering every governance record must satisfy.
pub fn validate_bounds(min: u64, max: u64, default: u64) -> Result<(), TypesError> {
    if min == 0 || min > default || default > max {
        return Err(TypesError::InvalidParams { min, max, default });
    }
    Ok(())
}

impl Default for VestingParams {
    fn default() -> Self {
        Self {
            min_duration_secs: DAY_SECS,
            max_duration_secs: 365 * DAY_SECS,
            default_duration_secs: 30 * DAY_SECS,
            name: "Staked Asset".to_string(),
            symbol: "sASSET".to_string(),
        }
    }
}
