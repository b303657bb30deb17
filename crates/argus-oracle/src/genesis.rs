//! Genesis state: chain-start initialization and full-state export.

use crate::keeper::Keeper;
use argus_core::{
    AccountId, AggregateExchangeRatePrevote, AggregateExchangeRateVote, DatedPrice, Pair, Params,
    Result, RewardPool, ValidatorId,
};
use serde::{Deserialize, Serialize};

/// The oracle module's complete persisted state in exportable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub feeder_delegations: Vec<(ValidatorId, AccountId)>,
    pub exchange_rates: Vec<(Pair, DatedPrice)>,
    pub miss_counters: Vec<(ValidatorId, u64)>,
    pub aggregate_prevotes: Vec<AggregateExchangeRatePrevote>,
    pub aggregate_votes: Vec<AggregateExchangeRateVote>,
    pub reward_pools: Vec<RewardPool>,
    pub rewards_id: u64,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: Params::default(),
            feeder_delegations: Vec::new(),
            exchange_rates: Vec::new(),
            miss_counters: Vec::new(),
            aggregate_prevotes: Vec::new(),
            aggregate_votes: Vec::new(),
            reward_pools: Vec::new(),
            rewards_id: 0,
        }
    }
}

impl GenesisState {
    pub fn validate(&self) -> Result<()> {
        self.params.validate()
    }
}

impl Keeper {
    /// Load a genesis state into the store. The vote-target whitelist is
    /// derived from the params whitelist, not carried separately. Aborts on
    /// an invalid genesis; a chain must not start from one.
    pub fn init_genesis(&mut self, genesis: &GenesisState) {
        if let Err(err) = genesis.validate() {
            panic!("invalid oracle genesis: {err}");
        }

        self.store.params = genesis.params.clone();
        self.store.whitelisted_pairs = genesis.params.whitelist.iter().cloned().collect();
        self.store.feeder_delegations = genesis.feeder_delegations.iter().cloned().collect();
        self.store.exchange_rates = genesis.exchange_rates.iter().cloned().collect();
        self.store.miss_counters = genesis.miss_counters.iter().cloned().collect();
        self.store.prevotes = genesis
            .aggregate_prevotes
            .iter()
            .map(|prevote| (prevote.voter, prevote.clone()))
            .collect();
        self.store.votes = genesis
            .aggregate_votes
            .iter()
            .map(|vote| (vote.voter, vote.clone()))
            .collect();
        self.store.rewards = genesis
            .reward_pools
            .iter()
            .map(|pool| (pool.id, pool.clone()))
            .collect();
        self.store.rewards_id = genesis.rewards_id;
    }

    /// Export the full store back into genesis form.
    pub fn export_genesis(&self) -> GenesisState {
        GenesisState {
            params: self.store.params.clone(),
            feeder_delegations: self
                .store
                .feeder_delegations
                .iter()
                .map(|(validator, feeder)| (*validator, *feeder))
                .collect(),
            exchange_rates: self
                .store
                .exchange_rates
                .iter()
                .map(|(pair, price)| (pair.clone(), price.clone()))
                .collect(),
            miss_counters: self
                .store
                .miss_counters
                .iter()
                .map(|(validator, misses)| (*validator, *misses))
                .collect(),
            aggregate_prevotes: self.store.prevotes.values().cloned().collect(),
            aggregate_votes: self.store.votes.values().cloned().collect(),
            reward_pools: self.store.rewards.values().cloned().collect(),
            rewards_id: self.store.rewards_id,
        }
    }
}
