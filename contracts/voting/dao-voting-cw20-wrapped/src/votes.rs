use cosmwasm_std::{Addr, Event, Storage, Uint128};

use crate::state::{
    load_balance, load_delegation, Delegation, BALANCES, DELEGATIONS, TOTAL_SUPPLY, VOTES,
};
use crate::ContractError;

/// Applies a balance change and keeps voting power in step with it. `from`
/// is `None` for mints (deposits) and `to` is `None` for burns
/// (withdrawals).
///
/// An account receiving tokens for the first time while its delegation is
/// [`Delegation::Unset`] is made its own delegate before voting power is
/// moved, so the received tokens count towards its own votes. Senders are
/// never bootstrapped and existing delegations are never overwritten.
///
/// Returns the `delegate_changed` and `delegate_votes_changed` events for
/// the change.
pub(crate) fn update_balances(
    storage: &mut dyn Storage,
    height: u64,
    from: Option<&Addr>,
    to: Option<&Addr>,
    amount: Uint128,
) -> Result<Vec<Event>, ContractError> {
    let mut events = vec![];

    match from {
        Some(from) => {
            let available = load_balance(storage, from)?;
            let remaining = available.checked_sub(amount).map_err(|_| {
                ContractError::InsufficientBalance {
                    available,
                    needed: amount,
                }
            })?;
            BALANCES.save(storage, from, &remaining)?;
        }
        None => {
            let supply = TOTAL_SUPPLY.latest(storage)?.checked_add(amount)?;
            TOTAL_SUPPLY.push(storage, height, supply)?;
        }
    }

    match to {
        Some(to) => {
            let previous = load_balance(storage, to)?;
            BALANCES.save(storage, to, &previous.checked_add(amount)?)?;

            // bootstrap self-delegation on the zero to non-zero transition
            if previous.is_zero()
                && !amount.is_zero()
                && load_delegation(storage, to)? == Delegation::Unset
            {
                let delegation = Delegation::Delegate(to.clone());
                DELEGATIONS.save(storage, to, &delegation)?;
                events.push(delegate_changed_event(
                    to,
                    &Delegation::Unset,
                    &delegation,
                ));
            }
        }
        None => {
            let supply = TOTAL_SUPPLY.latest(storage)?.checked_sub(amount)?;
            TOTAL_SUPPLY.push(storage, height, supply)?;
        }
    }

    let src = match from {
        Some(from) => load_delegation(storage, from)?,
        None => Delegation::Unset,
    };
    let dst = match to {
        Some(to) => load_delegation(storage, to)?,
        None => Delegation::Unset,
    };

    events.extend(move_voting_power(
        storage,
        height,
        src.voting_delegate(),
        dst.voting_delegate(),
        amount,
    )?);

    Ok(events)
}

/// Replaces the delegation of `delegator`, moving its whole balance of
/// voting power from the old delegate to the new one. Setting the current
/// delegation again changes nothing and emits no events.
pub(crate) fn set_delegation(
    storage: &mut dyn Storage,
    height: u64,
    delegator: &Addr,
    delegation: Delegation,
) -> Result<Vec<Event>, ContractError> {
    let previous = load_delegation(storage, delegator)?;
    if previous == delegation {
        return Ok(vec![]);
    }

    DELEGATIONS.save(storage, delegator, &delegation)?;

    let mut events = vec![delegate_changed_event(delegator, &previous, &delegation)];
    let balance = load_balance(storage, delegator)?;
    events.extend(move_voting_power(
        storage,
        height,
        previous.voting_delegate(),
        delegation.voting_delegate(),
        balance,
    )?);

    Ok(events)
}

/// Moves `amount` of voting power from `src` to `dst`, checkpointing both
/// at `height`. `None` on either side means nobody loses or gains the power.
fn move_voting_power(
    storage: &mut dyn Storage,
    height: u64,
    src: Option<&Addr>,
    dst: Option<&Addr>,
    amount: Uint128,
) -> Result<Vec<Event>, ContractError> {
    let mut events = vec![];
    if src == dst || amount.is_zero() {
        return Ok(events);
    }

    if let Some(src) = src {
        let votes = VOTES.latest(storage, src)?.checked_sub(amount)?;
        let (previous, new) = VOTES.push(storage, src, height, votes)?;
        events.push(delegate_votes_changed_event(src, previous, new));
    }
    if let Some(dst) = dst {
        let votes = VOTES.latest(storage, dst)?.checked_add(amount)?;
        let (previous, new) = VOTES.push(storage, dst, height, votes)?;
        events.push(delegate_votes_changed_event(dst, previous, new));
    }

    Ok(events)
}

fn delegate_changed_event(delegator: &Addr, from: &Delegation, to: &Delegation) -> Event {
    Event::new("delegate_changed")
        .add_attribute("delegator", delegator)
        .add_attribute("from_delegate", from.to_string())
        .add_attribute("to_delegate", to.to_string())
}

fn delegate_votes_changed_event(delegate: &Addr, previous: Uint128, new: Uint128) -> Event {
    Event::new("delegate_votes_changed")
        .add_attribute("delegate", delegate)
        .add_attribute("previous_votes", previous)
        .add_attribute("new_votes", new)
}
