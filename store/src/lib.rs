//! Abstract storage traits for the vestlock staking ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The ledger depends only on the traits.

pub mod error;
pub mod stake;

pub use error::StoreError;
pub use stake::{meta_keys, StakeBatch, StakeStore};
