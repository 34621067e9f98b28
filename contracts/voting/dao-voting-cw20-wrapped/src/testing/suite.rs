use anyhow::Result as AnyResult;
use cosmwasm_schema::serde::de::DeserializeOwned;
use cosmwasm_std::{to_json_binary, Addr, Empty, Event, StdResult, Uint128};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg, TokenInfoResponse};
use cw_checkpoints::Checkpoint;
use cw_multi_test::{next_block, App, AppResponse, Contract, ContractWrapper, Executor};

use crate::msg::{
    CheckpointResponse, DelegationResponse, ExecuteMsg, InstantiateMsg, NumCheckpointsResponse,
    QueryMsg, ReceiveMsg, TotalSupplyResponse, VotesResponse,
};

pub const CREATOR: &str = "creator";

pub fn cw20_base_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    );
    Box::new(contract)
}

pub fn wrapped_votes_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        crate::contract::execute,
        crate::contract::instantiate,
        crate::contract::query,
    )
    .with_migrate(crate::contract::migrate);
    Box::new(contract)
}

/// A cw20-base underlying token and a wrapper around it.
pub struct WrappedVotesSuite {
    pub app: App,
    pub wrapper_code_id: u64,
    /// the cw20-base token being wrapped
    pub underlying: Addr,
    /// the wrapper contract
    pub wrapper: Addr,
}

// CONSTRUCTOR
impl WrappedVotesSuite {
    /// Sets up an underlying token with the given initial balances and a
    /// wrapper with no deposits.
    pub fn new(initial_balances: &[(&str, u128)]) -> Self {
        let mut app = App::default();
        let cw20_code_id = app.store_code(cw20_base_contract());
        let wrapper_code_id = app.store_code(wrapped_votes_contract());

        let underlying = app
            .instantiate_contract(
                cw20_code_id,
                Addr::unchecked(CREATOR),
                &cw20_base::msg::InstantiateMsg {
                    name: "Governance".to_string(),
                    symbol: "GOV".to_string(),
                    decimals: 6,
                    initial_balances: initial_balances
                        .iter()
                        .map(|(address, amount)| Cw20Coin {
                            address: address.to_string(),
                            amount: Uint128::new(*amount),
                        })
                        .collect(),
                    mint: None,
                    marketing: None,
                },
                &[],
                "underlying",
                None,
            )
            .unwrap();

        let mut suite = Self {
            app,
            wrapper_code_id,
            underlying: underlying.clone(),
            wrapper: Addr::unchecked(""),
        };
        suite.wrapper = suite.instantiate_wrapper(&underlying, "Wrapped Governance", "wGOV");
        suite
    }

    /// Instantiates another wrapper around `underlying`.
    pub fn instantiate_wrapper(&mut self, underlying: &Addr, name: &str, symbol: &str) -> Addr {
        self.app
            .instantiate_contract(
                self.wrapper_code_id,
                Addr::unchecked(CREATOR),
                &InstantiateMsg {
                    underlying: underlying.to_string(),
                    name: name.to_string(),
                    symbol: symbol.to_string(),
                },
                &[],
                "wrapper",
                Some(CREATOR.to_string()),
            )
            .unwrap()
    }
}

// BLOCKS
impl WrappedVotesSuite {
    pub fn height(&self) -> u64 {
        self.app.block_info().height
    }

    pub fn next_block(&mut self) {
        self.app.update_block(next_block);
    }
}

// EXECUTIONS
impl WrappedVotesSuite {
    /// Approves the wrapper to pull `amount` of the underlying from `owner`.
    pub fn approve(&mut self, owner: &str, amount: u128) {
        self.app
            .execute_contract(
                Addr::unchecked(owner),
                self.underlying.clone(),
                &Cw20ExecuteMsg::IncreaseAllowance {
                    spender: self.wrapper.to_string(),
                    amount: Uint128::new(amount),
                    expires: None,
                },
                &[],
            )
            .unwrap();
    }

    pub fn deposit_for(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: u128,
    ) -> AnyResult<AppResponse> {
        self.execute(
            sender,
            &ExecuteMsg::DepositFor {
                recipient: recipient.to_string(),
                amount: Uint128::new(amount),
            },
        )
    }

    /// Approves and deposits in one go.
    pub fn deposit(&mut self, sender: &str, recipient: &str, amount: u128) -> AppResponse {
        self.approve(sender, amount);
        self.deposit_for(sender, recipient, amount).unwrap()
    }

    /// Deposits by sending the underlying token with cw20 `Send`.
    pub fn send_deposit(
        &mut self,
        sender: &str,
        recipient: Option<&str>,
        amount: u128,
    ) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            Addr::unchecked(sender),
            self.underlying.clone(),
            &Cw20ExecuteMsg::Send {
                contract: self.wrapper.to_string(),
                amount: Uint128::new(amount),
                msg: to_json_binary(&ReceiveMsg::Deposit {
                    recipient: recipient.map(|r| r.to_string()),
                })
                .unwrap(),
            },
            &[],
        )
    }

    pub fn withdraw_to(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: u128,
    ) -> AnyResult<AppResponse> {
        self.execute(
            sender,
            &ExecuteMsg::WithdrawTo {
                recipient: recipient.to_string(),
                amount: Uint128::new(amount),
            },
        )
    }

    pub fn transfer(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: u128,
    ) -> AnyResult<AppResponse> {
        self.execute(
            sender,
            &ExecuteMsg::Transfer {
                recipient: recipient.to_string(),
                amount: Uint128::new(amount),
            },
        )
    }

    pub fn delegate(&mut self, sender: &str, delegatee: Option<&str>) -> AnyResult<AppResponse> {
        self.execute(
            sender,
            &ExecuteMsg::Delegate {
                delegatee: delegatee.map(|d| d.to_string()),
            },
        )
    }

    pub fn execute(&mut self, sender: &str, msg: &ExecuteMsg) -> AnyResult<AppResponse> {
        self.app
            .execute_contract(Addr::unchecked(sender), self.wrapper.clone(), msg, &[])
    }
}

// QUERIES
impl WrappedVotesSuite {
    pub fn query<T: DeserializeOwned>(&self, msg: &QueryMsg) -> StdResult<T> {
        self.app.wrap().query_wasm_smart(&self.wrapper, msg)
    }

    pub fn balance(&self, address: &str) -> Uint128 {
        let res: BalanceResponse = self
            .query(&QueryMsg::Balance {
                address: address.to_string(),
            })
            .unwrap();
        res.balance
    }

    pub fn underlying_balance(&self, address: &str) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.underlying,
                &Cw20QueryMsg::Balance {
                    address: address.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    pub fn total_supply(&self) -> Uint128 {
        let res: TokenInfoResponse = self.query(&QueryMsg::TokenInfo {}).unwrap();
        res.total_supply
    }

    pub fn past_total_supply(&self, height: u64) -> StdResult<Uint128> {
        let res: TotalSupplyResponse = self.query(&QueryMsg::PastTotalSupply { height })?;
        Ok(res.total_supply)
    }

    pub fn votes(&self, address: &str) -> Uint128 {
        let res: VotesResponse = self
            .query(&QueryMsg::Votes {
                address: address.to_string(),
            })
            .unwrap();
        res.votes
    }

    pub fn past_votes(&self, address: &str, height: u64) -> StdResult<Uint128> {
        let res: VotesResponse = self.query(&QueryMsg::PastVotes {
            address: address.to_string(),
            height,
        })?;
        Ok(res.votes)
    }

    pub fn delegation(&self, address: &str) -> DelegationResponse {
        self.query(&QueryMsg::Delegation {
            address: address.to_string(),
        })
        .unwrap()
    }

    /// All checkpoints recorded for `address`, oldest first.
    pub fn checkpoints(&self, address: &str) -> Vec<Checkpoint> {
        let res: NumCheckpointsResponse = self
            .query(&QueryMsg::NumCheckpoints {
                address: address.to_string(),
            })
            .unwrap();
        (0..res.count)
            .map(|pos| {
                let res: CheckpointResponse = self
                    .query(&QueryMsg::Checkpoint {
                        address: address.to_string(),
                        pos,
                    })
                    .unwrap();
                res.checkpoint.unwrap()
            })
            .collect()
    }
}

/// Events of type `ty` emitted by contracts in `res`.
pub fn events<'a>(res: &'a AppResponse, ty: &str) -> Vec<&'a Event> {
    let ty = format!("wasm-{ty}");
    res.events.iter().filter(|e| e.ty == ty).collect()
}

pub fn attr<'a>(event: &'a Event, key: &str) -> &'a str {
    event
        .attributes
        .iter()
        .find(|a| a.key == key)
        .map(|a| a.value.as_str())
        .unwrap()
}
