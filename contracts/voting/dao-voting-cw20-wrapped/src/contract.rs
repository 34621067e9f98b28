#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, CosmosMsg, Deps, DepsMut, Env, MessageInfo, Response,
    StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use cw20::{
    BalanceResponse, Cw20Contract, Cw20ExecuteMsg, Cw20QueryMsg, Cw20ReceiveMsg,
    TokenInfoResponse,
};
use cw20_base::allowances::{
    deduct_allowance, execute_decrease_allowance, execute_increase_allowance, query_allowance,
};
use cw_utils::nonpayable;
use semver::Version;

use crate::msg::{
    CheckpointResponse, DelegationResponse, ExecuteMsg, InstantiateMsg, MigrateMsg,
    NumCheckpointsResponse, QueryMsg, ReceiveMsg, TotalSupplyResponse, VotesResponse,
};
use crate::state::{
    load_balance, load_delegation, Delegation, TokenInfo, TOKEN_INFO, TOTAL_SUPPLY, VOTES,
};
use crate::votes::{set_delegation, update_balances};
use crate::ContractError;

pub(crate) const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
pub(crate) const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if !is_valid_name(&msg.name) {
        return Err(ContractError::InvalidName {});
    }
    if !is_valid_symbol(&msg.symbol) {
        return Err(ContractError::InvalidSymbol {});
    }

    let underlying = deps.api.addr_validate(&msg.underlying)?;
    let underlying_info: TokenInfoResponse = deps
        .querier
        .query_wasm_smart(&underlying, &Cw20QueryMsg::TokenInfo {})?;

    TOKEN_INFO.save(
        deps.storage,
        &TokenInfo {
            name: msg.name,
            symbol: msg.symbol,
            decimals: underlying_info.decimals,
            underlying: underlying.clone(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("underlying", underlying)
        .add_attribute("decimals", underlying_info.decimals.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::DepositFor { recipient, amount } => {
            execute_deposit_for(deps, env, info, recipient, amount)
        }
        ExecuteMsg::Receive(msg) => execute_receive(deps, env, info, msg),
        ExecuteMsg::WithdrawTo { recipient, amount } => {
            execute_withdraw_to(deps, env, info, recipient, amount)
        }
        ExecuteMsg::Transfer { recipient, amount } => {
            execute_transfer(deps, env, info, recipient, amount)
        }
        ExecuteMsg::Send {
            contract,
            amount,
            msg,
        } => execute_send(deps, env, info, contract, amount, msg),
        ExecuteMsg::TransferFrom {
            owner,
            recipient,
            amount,
        } => execute_transfer_from(deps, env, info, owner, recipient, amount),
        ExecuteMsg::IncreaseAllowance {
            spender,
            amount,
            expires,
        } => Ok(execute_increase_allowance(
            deps, env, info, spender, amount, expires,
        )?),
        ExecuteMsg::DecreaseAllowance {
            spender,
            amount,
            expires,
        } => Ok(execute_decrease_allowance(
            deps, env, info, spender, amount, expires,
        )?),
        ExecuteMsg::Delegate { delegatee } => execute_delegate(deps, env, info, delegatee),
    }
}

pub fn execute_deposit_for(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let recipient = deps.api.addr_validate(&recipient)?;
    let token = TOKEN_INFO.load(deps.storage)?;

    let res = deposit(deps, &env, &info.sender, &recipient, amount)?;

    // if the underlying token refuses the transfer the whole message,
    // including the mint above, is reverted.
    let pull = Cw20Contract(token.underlying).call(Cw20ExecuteMsg::TransferFrom {
        owner: info.sender.to_string(),
        recipient: env.contract.address.to_string(),
        amount,
    })?;

    Ok(res.add_message(pull).add_attribute("action", "deposit_for"))
}

pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    wrapper: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let token = TOKEN_INFO.load(deps.storage)?;
    if info.sender != token.underlying {
        return Err(ContractError::InvalidToken {
            received: info.sender,
            expected: token.underlying,
        });
    }

    let msg: ReceiveMsg = from_json(&wrapper.msg)?;
    let payer = deps.api.addr_validate(&wrapper.sender)?;
    match msg {
        ReceiveMsg::Deposit { recipient } => {
            let recipient = recipient
                .map(|r| deps.api.addr_validate(&r))
                .transpose()?
                .unwrap_or_else(|| payer.clone());
            let res = deposit(deps, &env, &payer, &recipient, wrapper.amount)?;
            Ok(res.add_attribute("action", "deposit"))
        }
    }
}

/// Mints `amount` wrapped tokens to `recipient` for underlying tokens paid by
/// `payer`.
fn deposit(
    deps: DepsMut,
    env: &Env,
    payer: &Addr,
    recipient: &Addr,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }
    if *recipient == env.contract.address {
        return Err(ContractError::InvalidRecipient {});
    }

    let events = update_balances(
        deps.storage,
        env.block.height,
        None,
        Some(recipient),
        amount,
    )?;

    Ok(Response::new()
        .add_events(events)
        .add_attribute("payer", payer)
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount))
}

pub fn execute_withdraw_to(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    if amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }
    let recipient = deps.api.addr_validate(&recipient)?;
    if recipient == env.contract.address {
        return Err(ContractError::InvalidRecipient {});
    }
    let token = TOKEN_INFO.load(deps.storage)?;

    let events = update_balances(
        deps.storage,
        env.block.height,
        Some(&info.sender),
        None,
        amount,
    )?;

    let release = Cw20Contract(token.underlying).call(Cw20ExecuteMsg::Transfer {
        recipient: recipient.to_string(),
        amount,
    })?;

    Ok(Response::new()
        .add_message(release)
        .add_events(events)
        .add_attribute("action", "withdraw_to")
        .add_attribute("owner", info.sender)
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount))
}

pub fn execute_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let recipient = deps.api.addr_validate(&recipient)?;
    let res = transfer(deps, &env, &info.sender, &recipient, amount)?;
    Ok(res.add_attribute("action", "transfer"))
}

pub fn execute_send(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    contract: String,
    amount: Uint128,
    msg: Binary,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let contract = deps.api.addr_validate(&contract)?;
    let res = transfer(deps, &env, &info.sender, &contract, amount)?;

    let callback: CosmosMsg = Cw20ReceiveMsg {
        sender: info.sender.to_string(),
        amount,
        msg,
    }
    .into_cosmos_msg(contract)?;

    Ok(res.add_message(callback).add_attribute("action", "send"))
}

pub fn execute_transfer_from(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    owner: String,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let owner = deps.api.addr_validate(&owner)?;
    let recipient = deps.api.addr_validate(&recipient)?;

    deduct_allowance(deps.storage, &owner, &info.sender, &env.block, amount)?;

    let res = transfer(deps, &env, &owner, &recipient, amount)?;
    Ok(res
        .add_attribute("action", "transfer_from")
        .add_attribute("by", info.sender))
}

fn transfer(
    deps: DepsMut,
    env: &Env,
    owner: &Addr,
    recipient: &Addr,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }

    let events = update_balances(
        deps.storage,
        env.block.height,
        Some(owner),
        Some(recipient),
        amount,
    )?;

    Ok(Response::new()
        .add_events(events)
        .add_attribute("from", owner)
        .add_attribute("to", recipient)
        .add_attribute("amount", amount))
}

pub fn execute_delegate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    delegatee: Option<String>,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let delegation = match delegatee {
        Some(delegatee) => Delegation::Delegate(deps.api.addr_validate(&delegatee)?),
        None => Delegation::OptedOut,
    };

    let res = Response::new()
        .add_attribute("action", "delegate")
        .add_attribute("delegator", &info.sender)
        .add_attribute("delegatee", delegation.to_string());

    let events = set_delegation(deps.storage, env.block.height, &info.sender, delegation)?;

    Ok(res.add_events(events))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let res = match msg {
        QueryMsg::Balance { address } => to_json_binary(&query_balance(deps, address)?),
        QueryMsg::TokenInfo {} => to_json_binary(&query_token_info(deps)?),
        QueryMsg::Allowance { owner, spender } => {
            to_json_binary(&query_allowance(deps, owner, spender)?)
        }
        QueryMsg::Underlying {} => to_json_binary(&TOKEN_INFO.load(deps.storage)?.underlying),
        QueryMsg::Delegation { address } => to_json_binary(&query_delegation(deps, address)?),
        QueryMsg::Votes { address } => to_json_binary(&query_votes(deps, env, address)?),
        QueryMsg::PastVotes { address, height } => {
            to_json_binary(&query_past_votes(deps, env, address, height)?)
        }
        QueryMsg::PastTotalSupply { height } => {
            to_json_binary(&query_past_total_supply(deps, env, height)?)
        }
        QueryMsg::NumCheckpoints { address } => {
            to_json_binary(&query_num_checkpoints(deps, address)?)
        }
        QueryMsg::Checkpoint { address, pos } => {
            to_json_binary(&query_checkpoint(deps, address, pos)?)
        }
        QueryMsg::Info {} => to_json_binary(&get_contract_version(deps.storage)?),
    }?;
    Ok(res)
}

pub fn query_balance(deps: Deps, address: String) -> StdResult<BalanceResponse> {
    let address = deps.api.addr_validate(&address)?;
    let balance = load_balance(deps.storage, &address)?;
    Ok(BalanceResponse { balance })
}

pub fn query_token_info(deps: Deps) -> StdResult<TokenInfoResponse> {
    let info = TOKEN_INFO.load(deps.storage)?;
    let total_supply = TOTAL_SUPPLY.latest(deps.storage)?;
    Ok(TokenInfoResponse {
        name: info.name,
        symbol: info.symbol,
        decimals: info.decimals,
        total_supply,
    })
}

pub fn query_delegation(deps: Deps, address: String) -> StdResult<DelegationResponse> {
    let address = deps.api.addr_validate(&address)?;
    let delegation = load_delegation(deps.storage, &address)?;
    Ok(DelegationResponse {
        delegate: delegation.voting_delegate().cloned(),
        delegation,
    })
}

pub fn query_votes(deps: Deps, env: Env, address: String) -> StdResult<VotesResponse> {
    let address = deps.api.addr_validate(&address)?;
    let votes = VOTES.latest(deps.storage, &address)?;
    Ok(VotesResponse {
        votes,
        height: env.block.height,
    })
}

pub fn query_past_votes(
    deps: Deps,
    env: Env,
    address: String,
    height: u64,
) -> Result<VotesResponse, ContractError> {
    ensure_past(&env, height)?;
    let address = deps.api.addr_validate(&address)?;
    let votes = VOTES.at_height(deps.storage, &address, height)?;
    Ok(VotesResponse { votes, height })
}

pub fn query_past_total_supply(
    deps: Deps,
    env: Env,
    height: u64,
) -> Result<TotalSupplyResponse, ContractError> {
    ensure_past(&env, height)?;
    let total_supply = TOTAL_SUPPLY.at_height(deps.storage, height)?;
    Ok(TotalSupplyResponse {
        total_supply,
        height,
    })
}

pub fn query_num_checkpoints(deps: Deps, address: String) -> StdResult<NumCheckpointsResponse> {
    let address = deps.api.addr_validate(&address)?;
    let count = VOTES.len(deps.storage, &address)?;
    Ok(NumCheckpointsResponse { count })
}

pub fn query_checkpoint(deps: Deps, address: String, pos: u32) -> StdResult<CheckpointResponse> {
    let address = deps.api.addr_validate(&address)?;
    let checkpoint = VOTES.checkpoint(deps.storage, &address, pos)?;
    Ok(CheckpointResponse { checkpoint })
}

/// Historical lookups only see finalized blocks. Values at the current height
/// may still change within the block.
fn ensure_past(env: &Env, height: u64) -> Result<(), ContractError> {
    if height >= env.block.height {
        return Err(ContractError::FutureLookup {
            requested: height,
            current: env.block.height,
        });
    }
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    (3..=50).contains(&name.len())
}

fn is_valid_symbol(symbol: &str) -> bool {
    (3..=12).contains(&symbol.len())
        && symbol.bytes().all(|c| c.is_ascii_alphabetic() || c == b'-')
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let contract_version = get_contract_version(deps.storage)?;

    if contract_version.contract != CONTRACT_NAME {
        return Err(ContractError::MigrationErrorIncorrectContract {
            expected: CONTRACT_NAME.to_string(),
            actual: contract_version.contract,
        });
    }

    let new_version: Version = CONTRACT_VERSION.parse()?;
    let current_version: Version = contract_version.version.parse()?;

    // only allow upgrades
    if new_version <= current_version {
        return Err(ContractError::MigrationErrorInvalidVersion {
            new: new_version.to_string(),
            current: current_version.to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new().add_attribute("action", "migrate"))
}
