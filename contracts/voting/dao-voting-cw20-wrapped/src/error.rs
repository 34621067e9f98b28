use cosmwasm_std::{Addr, OverflowError, StdError, Uint128};
use cw_checkpoints::CheckpointError;
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error(transparent)]
    Overflow(#[from] OverflowError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Cw20Error(#[from] cw20_base::ContractError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("semver parsing error: {0}")]
    SemVer(String),

    #[error("insufficient balance: available {available}, needed {needed}")]
    InsufficientBalance { available: Uint128, needed: Uint128 },

    #[error("invalid token: received {received}, expected {expected}")]
    InvalidToken { received: Addr, expected: Addr },

    #[error("amount must be greater than zero")]
    InvalidZeroAmount {},

    #[error("the wrapper can not be the recipient of its own deposits or withdrawals")]
    InvalidRecipient {},

    #[error("future lookup: height {requested} is not before the current height {current}")]
    FutureLookup { requested: u64, current: u64 },

    #[error("name must be 3-50 characters")]
    InvalidName {},

    #[error("symbol must be 3-12 characters of [a-zA-Z\\-]")]
    InvalidSymbol {},

    #[error("migration error: incorrect contract: expected {expected}, actual {actual}")]
    MigrationErrorIncorrectContract { expected: String, actual: String },

    #[error("migration error: invalid version: new {new}, current {current}")]
    MigrationErrorInvalidVersion { new: String, current: String },
}

impl From<semver::Error> for ContractError {
    fn from(err: semver::Error) -> Self {
        Self::SemVer(err.to_string())
    }
}
