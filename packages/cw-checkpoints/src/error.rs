use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CheckpointError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("checkpoint at height {height} precedes latest checkpoint at height {latest}")]
    OutOfOrder { height: u64, latest: u64 },
}
