//! Delegation registry.
//!
//! An account may register exactly one delegate, and a delegate may represent
//! exactly one account. A delegate manages the account's positions without
//! holding its custody: ledger entries are keyed by the account while asset
//! movement stays with the delegate's own external balance.

pub mod error;
pub mod registry;

pub use error::DelegationError;
pub use registry::{DelegationRegistry, DelegationSnapshot};
