//! Fundamental types for the vestlock staking ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, timestamps, and the default vesting parameters.

pub mod address;
pub mod error;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use error::TypesError;
pub use params::VestingParams;
pub use time::Timestamp;
