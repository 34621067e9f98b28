use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, StdResult, Storage, Uint128};
use cw_checkpoints::{CheckpointMap, Checkpoints};
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    /// copied from the underlying token at instantiation.
    pub decimals: u8,
    /// the cw20 token held in custody for wrapped balances.
    pub underlying: Addr,
}

/// Where an account's voting power goes.
#[cw_serde]
pub enum Delegation {
    /// never delegated. only ever the initial state of an account; it is
    /// left the first time the account receives tokens or delegates.
    Unset,
    /// explicitly chose to have nobody accrue its voting power.
    OptedOut,
    /// voting power accrues to this account, which may be the delegator.
    Delegate(Addr),
}

impl Delegation {
    /// the account that accrues voting power under this delegation, if any.
    pub fn voting_delegate(&self) -> Option<&Addr> {
        match self {
            Delegation::Delegate(delegate) => Some(delegate),
            Delegation::Unset | Delegation::OptedOut => None,
        }
    }
}

impl fmt::Display for Delegation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delegation::Unset => write!(f, "unset"),
            Delegation::OptedOut => write!(f, "none"),
            Delegation::Delegate(delegate) => write!(f, "{delegate}"),
        }
    }
}

pub const TOKEN_INFO: Item<TokenInfo> = Item::new("token_info");

/// wrapped balances. the sum of all entries equals the underlying held by
/// the contract.
pub const BALANCES: Map<&Addr, Uint128> = Map::new("balances");

/// explicit delegations. a missing entry is [`Delegation::Unset`], which is
/// never stored.
pub const DELEGATIONS: Map<&Addr, Delegation> = Map::new("delegations");

/// the voting power received by each delegate over time.
pub const VOTES: CheckpointMap<&Addr> = CheckpointMap::new("votes__checkpoints", "votes__lengths");

/// the total wrapped supply over time.
pub const TOTAL_SUPPLY: Checkpoints =
    Checkpoints::new("total_supply__checkpoints", "total_supply__length");

pub fn load_balance(storage: &dyn Storage, addr: &Addr) -> StdResult<Uint128> {
    Ok(BALANCES.may_load(storage, addr)?.unwrap_or_default())
}

pub fn load_delegation(storage: &dyn Storage, addr: &Addr) -> StdResult<Delegation> {
    Ok(DELEGATIONS
        .may_load(storage, addr)?
        .unwrap_or(Delegation::Unset))
}
