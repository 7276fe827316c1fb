//! Errors raised while constructing or parsing core types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account identifier: {0:?}")]
    InvalidAccount(String),

    #[error("invalid vesting parameters: require 0 < min ({min}) <= default ({default}) <= max ({max})")]
    InvalidParams { min: u64, max: u64, default: u64 },
}
