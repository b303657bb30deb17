//! The end-of-vote-period pipeline.
//!
//! [`Keeper::update_exchange_rates`] runs once per vote period, at its final
//! block, and is the only writer of consensus prices. Stage order is fixed:
//! a vote must be grouped and filtered before tallying, tallied before miss
//! counting, and counted before rewards, or the period's bookkeeping would
//! disagree with the prices it produced.

use crate::ballot::tally;
use crate::keeper::{BlockContext, Keeper};
use argus_core::{ExchangeRateVotes, Pair, ValidatorPerformance, ValidatorPerformances};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

impl Keeper {
    /// Process the period's revealed votes into consensus prices, reward and
    /// miss bookkeeping, and a refreshed whitelist. Returns the per-validator
    /// performance records for observability.
    pub fn update_exchange_rates(&mut self, ctx: &BlockContext) -> ValidatorPerformances {
        info!(height = ctx.height, "processing validator price votes");

        let mut performances = self.new_validator_performances();

        // working copy: pairs that fail the validity filter drop out of this
        // set for the period but stay whitelisted in the store
        let mut whitelisted_pairs: BTreeSet<Pair> = self.store.whitelisted_pairs.clone();

        let pair_votes = self.get_pair_votes(&performances, &mut whitelisted_pairs);

        self.clear_exchange_rates(ctx, &pair_votes);
        self.tally_votes_and_update_prices(ctx, &pair_votes, &mut performances);

        self.increment_miss_counters(&performances);
        increment_abstains_by_omission(whitelisted_pairs.len(), &mut performances);

        self.reward_winners(&performances);

        let params = self.store.params.clone();
        self.clear_votes_and_prevotes(ctx, params.vote_period);
        self.refresh_whitelist(&params.whitelist, &whitelisted_pairs);

        for performance in performances.values() {
            info!(
                validator = %performance.validator,
                voting_power = performance.power,
                reward_weight = performance.reward_weight,
                wins = performance.win_count,
                abstains = performance.abstain_count,
                misses = performance.miss_count,
                "validator performance"
            );
        }

        performances
    }

    /// Fresh performance records for the active set: bonded validators by
    /// descending power, capped at the staking provider's max set size.
    fn new_validator_performances(&self) -> ValidatorPerformances {
        let mut performances = ValidatorPerformances::new();
        let max_validators = self.staking.max_validators() as usize;
        for validator in self
            .staking
            .validators_by_power()
            .into_iter()
            .filter(|v| v.bonded)
            .take(max_validators)
        {
            performances.insert(ValidatorPerformance::new(validator.power, validator.operator));
        }
        performances
    }

    fn get_pair_votes(
        &self,
        performances: &ValidatorPerformances,
        whitelisted_pairs: &mut BTreeSet<Pair>,
    ) -> BTreeMap<Pair, ExchangeRateVotes> {
        let mut pair_votes = self.group_votes_by_pair(performances);
        self.remove_invalid_votes(&mut pair_votes, whitelisted_pairs);
        pair_votes
    }

    fn tally_votes_and_update_prices(
        &mut self,
        ctx: &BlockContext,
        pair_votes: &BTreeMap<Pair, ExchangeRateVotes>,
        performances: &mut ValidatorPerformances,
    ) {
        let reward_band = self.store.params.reward_band;
        for (pair, votes) in pair_votes {
            let exchange_rate = tally(votes, reward_band, performances);
            self.set_price(ctx, pair, exchange_rate);
        }
    }

    /// Fold the period's miss counts into the persistent per-window
    /// counters the slashing cadence reads.
    fn increment_miss_counters(&mut self, performances: &ValidatorPerformances) {
        for performance in performances.values() {
            if performance.miss_count > 0 {
                let counter = self
                    .store
                    .miss_counters
                    .entry(performance.validator)
                    .or_insert(0);
                *counter += performance.miss_count as u64;
                info!(validator = %performance.validator, misses = performance.miss_count, "vote miss");
            }
        }
    }
}

/// Pairs a validator never mentioned in its reveal count as abstentions:
/// whatever remains of the period's tallied pairs after wins, explicit
/// abstains, and misses.
fn increment_abstains_by_omission(num_pairs: usize, performances: &mut ValidatorPerformances) {
    for performance in performances.values_mut() {
        let omitted = num_pairs as i64
            - (performance.win_count + performance.abstain_count + performance.miss_count);
        if omitted > 0 {
            performance.abstain_count += omitted;
        }
    }
}
