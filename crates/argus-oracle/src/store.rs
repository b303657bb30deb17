//! Oracle state store.
//!
//! One logical key-value store scoped to a block's execution context. Every
//! keyed collection is a `BTreeMap`/`BTreeSet` so walks are deterministic
//! across all nodes replaying the same block.

use argus_core::{
    AccountId, AggregateExchangeRatePrevote, AggregateExchangeRateVote, DatedPrice, Pair, Params,
    PriceSnapshot, RewardPool, ValidatorId,
};
use std::collections::{BTreeMap, BTreeSet};

/// The oracle module's persisted state.
#[derive(Clone, Debug, Default)]
pub struct OracleStore {
    /// Governance parameters.
    pub(crate) params: Params,

    /// Latest consensus price per pair.
    pub(crate) exchange_rates: BTreeMap<Pair, DatedPrice>,

    /// Append-only price history keyed by `(pair, timestamp)`. Unbounded
    /// growth is an external-pruning concern.
    pub(crate) price_snapshots: BTreeMap<(Pair, i64), PriceSnapshot>,

    /// Feeder consent: validator -> delegated feeder account.
    pub(crate) feeder_delegations: BTreeMap<ValidatorId, AccountId>,

    /// Missed-vote totals over the current slash window.
    pub(crate) miss_counters: BTreeMap<ValidatorId, u64>,

    /// One live commitment per validator.
    pub(crate) prevotes: BTreeMap<ValidatorId, AggregateExchangeRatePrevote>,

    /// One revealed vote per validator.
    pub(crate) votes: BTreeMap<ValidatorId, AggregateExchangeRateVote>,

    /// The active vote-target set.
    pub(crate) whitelisted_pairs: BTreeSet<Pair>,

    /// Live reward pools by id.
    pub(crate) rewards: BTreeMap<u64, RewardPool>,

    /// Next reward pool id.
    pub(crate) rewards_id: u64,
}

impl OracleStore {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Allocate the next reward pool id.
    pub(crate) fn next_rewards_id(&mut self) -> u64 {
        let id = self.rewards_id;
        self.rewards_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards_id_sequence() {
        let mut store = OracleStore::new(Params::default());
        assert_eq!(store.next_rewards_id(), 0);
        assert_eq!(store.next_rewards_id(), 1);
        assert_eq!(store.next_rewards_id(), 2);
    }
}
