#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdResult, Storage, Uint128};
use cw_storage_plus::{Item, KeyDeserialize, Map, Prefixer, PrimaryKey};

mod error;

pub use crate::error::CheckpointError;

/// A value recorded at a block height.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct Checkpoint {
    /// The height from which this value is in effect.
    pub height: u64,
    pub value: Uint128,
}

/// Per-key histories of checkpoints. Each history is an indexed array of
/// checkpoints with non-decreasing heights and at most one checkpoint per
/// height.
pub struct CheckpointMap<'a, K> {
    /// Checkpoints for a key, indexed by position in its history.
    checkpoints: Map<'a, (K, u32), Checkpoint>,
    /// The number of checkpoints per key.
    lengths: Map<'a, K, u32>,
}

impl<'a, K> CheckpointMap<'a, K> {
    /// Creates a new [`CheckpointMap`] with the given storage keys.
    ///
    /// ```rust
    /// use cosmwasm_std::Addr;
    /// use cw_checkpoints::CheckpointMap;
    ///
    /// pub const VOTES: CheckpointMap<&Addr> =
    ///     CheckpointMap::new("votes__checkpoints", "votes__lengths");
    /// ```
    pub const fn new(checkpoints_key: &'a str, lengths_key: &'a str) -> Self {
        CheckpointMap {
            checkpoints: Map::new(checkpoints_key),
            lengths: Map::new(lengths_key),
        }
    }
}

impl<'a, K> CheckpointMap<'a, K>
where
    K: Clone + KeyDeserialize + Prefixer<'a> + PrimaryKey<'a>,
{
    /// Records `value` for `k` at `height`, returning the previous latest
    /// value and the new one. If the latest checkpoint is already at
    /// `height` its value is overwritten. Heights below the latest
    /// checkpoint's height are rejected.
    pub fn push(
        &self,
        store: &mut dyn Storage,
        k: K,
        height: u64,
        value: Uint128,
    ) -> Result<(Uint128, Uint128), CheckpointError> {
        let len = self.len(store, k.clone())?;
        let last = self.last(store, k.clone(), len)?;
        let (pos, previous) = next_slot(len, last.as_ref(), height)?;

        self.checkpoints
            .save(store, (k.clone(), pos), &Checkpoint { height, value })?;
        if pos == len {
            self.lengths.save(store, k, &(len + 1))?;
        }

        Ok((previous, value))
    }

    /// The latest value for `k`, or zero if it has no history.
    pub fn latest(&self, store: &dyn Storage, k: K) -> StdResult<Uint128> {
        Ok(self
            .latest_checkpoint(store, k)?
            .map(|c| c.value)
            .unwrap_or_default())
    }

    pub fn latest_checkpoint(&self, store: &dyn Storage, k: K) -> StdResult<Option<Checkpoint>> {
        let len = self.len(store, k.clone())?;
        self.last(store, k, len)
    }

    /// The value for `k` in effect at `height`: the value of the checkpoint
    /// with the greatest height less than or equal to `height`, or zero if
    /// there is none.
    pub fn at_height(&self, store: &dyn Storage, k: K, height: u64) -> StdResult<Uint128> {
        let len = self.len(store, k.clone())?;
        let found = upper_lookup(len, height, |pos| {
            self.checkpoints.load(store, (k.clone(), pos))
        })?;
        Ok(found.map(|c| c.value).unwrap_or_default())
    }

    /// The number of checkpoints recorded for `k`.
    pub fn len(&self, store: &dyn Storage, k: K) -> StdResult<u32> {
        Ok(self.lengths.may_load(store, k)?.unwrap_or_default())
    }

    /// The checkpoint at position `pos` in the history of `k`, if any.
    pub fn checkpoint(&self, store: &dyn Storage, k: K, pos: u32) -> StdResult<Option<Checkpoint>> {
        self.checkpoints.may_load(store, (k, pos))
    }

    fn last(&self, store: &dyn Storage, k: K, len: u32) -> StdResult<Option<Checkpoint>> {
        match len {
            0 => Ok(None),
            len => self.checkpoints.may_load(store, (k, len - 1)),
        }
    }
}

/// A single history of checkpoints, for example a total supply.
pub struct Checkpoints<'a> {
    checkpoints: Map<'a, u32, Checkpoint>,
    length: Item<'a, u32>,
}

impl<'a> Checkpoints<'a> {
    pub const fn new(checkpoints_key: &'a str, length_key: &'a str) -> Self {
        Checkpoints {
            checkpoints: Map::new(checkpoints_key),
            length: Item::new(length_key),
        }
    }

    /// Records `value` at `height`. Same rules as [`CheckpointMap::push`].
    pub fn push(
        &self,
        store: &mut dyn Storage,
        height: u64,
        value: Uint128,
    ) -> Result<(Uint128, Uint128), CheckpointError> {
        let len = self.len(store)?;
        let last = self.last(store, len)?;
        let (pos, previous) = next_slot(len, last.as_ref(), height)?;

        self.checkpoints
            .save(store, pos, &Checkpoint { height, value })?;
        if pos == len {
            self.length.save(store, &(len + 1))?;
        }

        Ok((previous, value))
    }

    pub fn latest(&self, store: &dyn Storage) -> StdResult<Uint128> {
        Ok(self
            .latest_checkpoint(store)?
            .map(|c| c.value)
            .unwrap_or_default())
    }

    pub fn latest_checkpoint(&self, store: &dyn Storage) -> StdResult<Option<Checkpoint>> {
        let len = self.len(store)?;
        self.last(store, len)
    }

    pub fn at_height(&self, store: &dyn Storage, height: u64) -> StdResult<Uint128> {
        let len = self.len(store)?;
        let found = upper_lookup(len, height, |pos| self.checkpoints.load(store, pos))?;
        Ok(found.map(|c| c.value).unwrap_or_default())
    }

    pub fn len(&self, store: &dyn Storage) -> StdResult<u32> {
        Ok(self.length.may_load(store)?.unwrap_or_default())
    }

    pub fn checkpoint(&self, store: &dyn Storage, pos: u32) -> StdResult<Option<Checkpoint>> {
        self.checkpoints.may_load(store, pos)
    }

    fn last(&self, store: &dyn Storage, len: u32) -> StdResult<Option<Checkpoint>> {
        match len {
            0 => Ok(None),
            len => self.checkpoints.may_load(store, len - 1),
        }
    }
}

/// Returns the position a checkpoint at `height` is written to and the value
/// it replaces as the latest.
fn next_slot(
    len: u32,
    last: Option<&Checkpoint>,
    height: u64,
) -> Result<(u32, Uint128), CheckpointError> {
    match last {
        Some(last) if height < last.height => Err(CheckpointError::OutOfOrder {
            height,
            latest: last.height,
        }),
        // same block, coalesce
        Some(last) if height == last.height => Ok((len - 1, last.value)),
        Some(last) => Ok((len, last.value)),
        None => Ok((0, Uint128::zero())),
    }
}

/// Binary searches a history of `len` checkpoints for the last one with a
/// height less than or equal to `height`.
fn upper_lookup<F>(len: u32, height: u64, load: F) -> StdResult<Option<Checkpoint>>
where
    F: Fn(u32) -> StdResult<Checkpoint>,
{
    // find the first position whose height is after `height`
    let mut low = 0;
    let mut high = len;
    while low < high {
        let mid = low + (high - low) / 2;
        if load(mid)?.height > height {
            high = mid;
        } else {
            low = mid + 1;
        }
    }

    match high {
        0 => Ok(None),
        high => load(high - 1).map(Some),
    }
}
