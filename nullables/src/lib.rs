//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the ledger (time, asset custody, storage)
//! sits behind a trait or an explicit argument. This crate provides
//! test-friendly stand-ins that return deterministic values, can be steered
//! programmatically, and never touch the filesystem.

pub mod clock;
pub mod gateway;
pub mod store;

pub use clock::NullClock;
pub use gateway::NullGateway;
pub use store::NullStakeStore;
