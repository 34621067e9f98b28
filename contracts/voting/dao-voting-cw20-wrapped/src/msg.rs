use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Uint128};
use cw20::{Cw20ReceiveMsg, Expiration};
use cw_checkpoints::Checkpoint;

use crate::state::Delegation;

#[cw_serde]
pub struct InstantiateMsg {
    /// The cw20 token being wrapped. Decimals are copied from it.
    pub underlying: String,
    pub name: String,
    pub symbol: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Pulls `amount` of the underlying token from the sender and mints the
    /// same amount of wrapped tokens to `recipient`. The sender must have
    /// approved this contract to spend the underlying token.
    DepositFor { recipient: String, amount: Uint128 },
    /// Deposits underlying tokens sent with cw20 `Send`. Only accepted from
    /// the underlying token contract.
    Receive(Cw20ReceiveMsg),
    /// Burns `amount` of the sender's wrapped tokens and releases the same
    /// amount of the underlying token to `recipient`.
    WithdrawTo { recipient: String, amount: Uint128 },
    Transfer { recipient: String, amount: Uint128 },
    /// Transfers to a contract and calls `Receive` on it.
    Send {
        contract: String,
        amount: Uint128,
        msg: Binary,
    },
    /// Transfers on behalf of `owner` using an allowance.
    TransferFrom {
        owner: String,
        recipient: String,
        amount: Uint128,
    },
    IncreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    DecreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    /// Sets where the sender's voting power goes. `None` opts out: nobody
    /// accrues the sender's voting power until it delegates again.
    Delegate { delegatee: Option<String> },
}

#[cw_serde]
pub enum ReceiveMsg {
    /// Mints wrapped tokens to `recipient`, defaulting to the sender of the
    /// underlying tokens.
    Deposit { recipient: Option<String> },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(cw20::BalanceResponse)]
    Balance { address: String },
    #[returns(cw20::TokenInfoResponse)]
    TokenInfo {},
    #[returns(cw20::AllowanceResponse)]
    Allowance { owner: String, spender: String },
    /// The address of the wrapped cw20 token.
    #[returns(Addr)]
    Underlying {},
    #[returns(DelegationResponse)]
    Delegation { address: String },
    /// The voting power currently delegated to `address`.
    #[returns(VotesResponse)]
    Votes { address: String },
    /// The voting power delegated to `address` at a past height. Fails for
    /// the current or future heights.
    #[returns(VotesResponse)]
    PastVotes { address: String, height: u64 },
    /// The total supply at a past height. Fails for the current or future
    /// heights.
    #[returns(TotalSupplyResponse)]
    PastTotalSupply { height: u64 },
    #[returns(NumCheckpointsResponse)]
    NumCheckpoints { address: String },
    #[returns(CheckpointResponse)]
    Checkpoint { address: String, pos: u32 },
    #[returns(cw2::ContractVersion)]
    Info {},
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct DelegationResponse {
    pub delegation: Delegation,
    /// The account accruing the voting power, if any.
    pub delegate: Option<Addr>,
}

#[cw_serde]
pub struct VotesResponse {
    pub votes: Uint128,
    pub height: u64,
}

#[cw_serde]
pub struct TotalSupplyResponse {
    pub total_supply: Uint128,
    pub height: u64,
}

#[cw_serde]
pub struct NumCheckpointsResponse {
    pub count: u32,
}

#[cw_serde]
pub struct CheckpointResponse {
    pub checkpoint: Option<Checkpoint>,
}
