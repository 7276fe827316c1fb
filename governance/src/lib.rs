//! Owner-gated governance for the staking ledger.
//!
//! A single [`GovernanceConfig`] record holds the vesting duration bounds new
//! positions are checked against, plus descriptive metadata. Only the owner
//! fixed at construction may change it. Bound changes never touch positions
//! that already exist.

pub mod config;
pub mod error;
pub mod params;

pub use config::GovernanceConfig;
pub use error::GovernanceError;
pub use params::GovernableParam;
