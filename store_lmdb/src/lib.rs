//! LMDB storage backend for the vestlock staking ledger.
//!
//! Implements the storage traits from `vestlock-store` using the `heed` LMDB
//! bindings. Every logical store maps to one named database within a single
//! environment.

pub mod environment;
pub mod error;
pub mod stake;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use stake::LmdbStakeStore;
