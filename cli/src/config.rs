//! Command line configuration, loaded from TOML.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vestlock_store_lmdb::environment::DEFAULT_MAP_SIZE;
use vestlock_types::{AccountId, VestingParams};
use vestlock_utils::LogFormat;
use vestlock_vesting::StakeMergePolicy;

/// Settings for one `vestlock` invocation.
///
/// `owner` and `params` only matter when the data directory holds no ledger
/// yet; an existing ledger keeps the governance record it was saved with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Governance owner for a freshly initialised ledger.
    #[serde(default)]
    pub owner: Option<AccountId>,

    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Duration bounds and metadata the governance record is seeded from.
    #[serde(default)]
    pub params: VestingParams,

    #[serde(default)]
    pub merge_policy: StakeMergePolicy,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./vestlock_data")
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(owner) = &self.owner {
            if !owner.is_valid() {
                return Err(ConfigError::Invalid(format!("owner {owner:?} is not a valid account")));
            }
        }
        if self.map_size == 0 {
            return Err(ConfigError::Invalid("map_size must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            owner: None,
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            params: VestingParams::default(),
            merge_policy: StakeMergePolicy::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
