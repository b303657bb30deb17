//! Ballot construction and tallying.
//!
//! Revealed votes are regrouped into one ballot per pair, filtered for
//! sufficient participation, and collapsed to a consensus price by
//! power-weighted median. Classification against the reward band feeds the
//! per-period [`argus_core::ValidatorPerformance`] records.

use crate::keeper::{BlockContext, Keeper};
use argus_core::{ExchangeRateVote, ExchangeRateVotes, Pair, ValidatorPerformances};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, BTreeSet};

impl Keeper {
    /// Regroup the revealed per-validator votes into one ballot per pair.
    ///
    /// Votes from validators outside the active performance set are dropped.
    /// A non-positive rate is an abstention: the entry is kept so it can be
    /// classified, but carries zero ballot power.
    pub fn group_votes_by_pair(
        &self,
        performances: &ValidatorPerformances,
    ) -> BTreeMap<Pair, ExchangeRateVotes> {
        let mut pair_votes: BTreeMap<Pair, ExchangeRateVotes> = BTreeMap::new();
        for (voter, vote) in &self.store.votes {
            let Some(performance) = performances.get(voter) else {
                continue;
            };
            for tuple in &vote.tuples {
                let power = if tuple.exchange_rate > Decimal::ZERO {
                    performance.power
                } else {
                    0
                };
                pair_votes
                    .entry(tuple.pair.clone())
                    .or_default()
                    .push(ExchangeRateVote::new(
                        tuple.exchange_rate,
                        tuple.pair.clone(),
                        *voter,
                        power,
                    ));
            }
        }
        pair_votes
    }

    /// Drop ballots that are not whitelisted or fail the participation
    /// checks. A failing pair is also removed from the period's working
    /// whitelist so non-voters are not counted as having omitted it.
    pub fn remove_invalid_votes(
        &self,
        pair_votes: &mut BTreeMap<Pair, ExchangeRateVotes>,
        whitelisted_pairs: &mut BTreeSet<Pair>,
    ) {
        let total_bonded_power = self.staking.total_bonded_power();
        let threshold_power = (self.store.params.vote_threshold
            * Decimal::from(total_bonded_power))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let min_voters = self.store.params.min_voters;

        let pairs: Vec<Pair> = pair_votes.keys().cloned().collect();
        for pair in pairs {
            if !whitelisted_pairs.contains(&pair) {
                pair_votes.remove(&pair);
                continue;
            }
            let passing = pair_votes
                .get(&pair)
                .is_some_and(|votes| is_passing_vote_threshold(votes, threshold_power, min_voters));
            if !passing {
                whitelisted_pairs.remove(&pair);
                pair_votes.remove(&pair);
            }
        }
    }

    /// End-of-period cleanup: all votes go, prevotes survive only while
    /// their reveal window is still open.
    pub fn clear_votes_and_prevotes(&mut self, ctx: &BlockContext, vote_period: u64) {
        self.store
            .prevotes
            .retain(|_, prevote| ctx.height < prevote.submit_block + vote_period);
        self.store.votes.clear();
    }
}

/// Participation checks for one ballot: non-zero power, power at or above
/// the threshold, and enough distinct live voters.
pub fn is_passing_vote_threshold(
    votes: &ExchangeRateVotes,
    threshold_power: Decimal,
    min_voters: u64,
) -> bool {
    let total_power = votes.power();
    if total_power == 0 {
        return false;
    }
    if Decimal::from(total_power) < threshold_power {
        return false;
    }
    if votes.num_valid_voters() < min_voters {
        return false;
    }
    true
}

/// Collapse one ballot to its power-weighted median and classify every vote
/// against the reward band, mutating the performance records in place.
///
/// The band half-width is `median * reward_band / 2`, widened to the
/// ballot's standard deviation when votes are more dispersed than the
/// configured band. Abstentions are classified before the band check, so a
/// non-positive rate is never a win or a miss.
pub fn tally(
    votes: &ExchangeRateVotes,
    reward_band: Decimal,
    performances: &mut ValidatorPerformances,
) -> Decimal {
    let weighted_median = votes.weighted_median();
    let standard_deviation = votes.standard_deviation(weighted_median);

    let mut reward_spread = weighted_median * reward_band / Decimal::from(2);
    if standard_deviation > reward_spread {
        reward_spread = standard_deviation;
    }

    for vote in votes {
        let Some(performance) = performances.get_mut(&vote.voter) else {
            continue;
        };
        if vote.exchange_rate <= Decimal::ZERO {
            performance.abstain_count += 1;
        } else if vote.exchange_rate >= weighted_median - reward_spread
            && vote.exchange_rate <= weighted_median + reward_spread
        {
            performance.reward_weight += vote.power;
            performance.win_count += 1;
        } else {
            performance.miss_count += 1;
        }
    }

    weighted_median
}
