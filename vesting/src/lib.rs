//! Vesting ledger — time-locked stake positions with linear unlock.
//!
//! Each position unlocks linearly from its origin over its duration:
//! `vested(t) = deposited × min(t − origin, duration) / duration`.
//!
//! This crate handles:
//! - Opening positions and merging deposits into the latest open one
//! - Computing withdrawable amounts and draining positions oldest first
//! - Routing delegated callers to the account they act for
//! - Staging each mutation so a failed asset transfer leaves no trace

pub mod engine;
pub mod error;
pub mod event;
pub mod math;
pub mod position;
pub mod state;

pub use engine::{StakeMergePolicy, VestingLedger};
pub use error::{ErrorClass, VestingError};
pub use event::{EventBus, StakingEvent};
pub use position::StakePosition;
pub use state::{AccountLedger, LedgerChange};
