//! Governable fields of the config record.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    MinDuration,
    MaxDuration,
    DefaultDuration,
    Name,
    Symbol,
}

impl GovernableParam {
    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinDuration => "min_duration_secs",
            Self::MaxDuration => "max_duration_secs",
            Self::DefaultDuration => "default_duration_secs",
            Self::Name => "name",
            Self::Symbol => "symbol",
        }
    }
}
