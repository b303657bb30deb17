//! Reward pool funding and per-period distribution.
//!
//! Anyone may fund a pool spread evenly over a number of future vote
//! periods. At the end of each period the pipeline gathers one installment
//! from every live pool and splits it across validators in proportion to
//! their reward weight.

use crate::keeper::{Keeper, MODULE_NAME};
use argus_core::{Coins, OracleError, Result, RewardPool, ValidatorPerformances};
use tracing::error;

impl Keeper {
    /// Fund a new reward pool. `total_coins` moves from `funder_module` into
    /// the oracle module account; each of the `vote_periods` installments
    /// pays out `total_coins / vote_periods`, truncated per denom. Dust from
    /// the truncation stays in the oracle module account.
    pub fn allocate_rewards(
        &mut self,
        funder_module: &str,
        total_coins: &Coins,
        vote_periods: u64,
    ) -> Result<()> {
        if vote_periods == 0 {
            return Err(OracleError::InvalidInput(
                "reward vote periods must be positive".to_string(),
            ));
        }

        let coins_per_period = total_coins.quo(vote_periods);
        let id = self.store.next_rewards_id();
        self.store.rewards.insert(
            id,
            RewardPool {
                id,
                vote_periods,
                coins: coins_per_period,
            },
        );

        self.bank
            .send_coins_module_to_module(funder_module, MODULE_NAME, total_coins)
    }

    /// Collect one installment from every live pool, decrementing each
    /// pool's remaining periods and deleting the ones that hit zero.
    pub(crate) fn gather_rewards_for_vote_period(&mut self) -> Coins {
        let mut coins = Coins::new();
        let ids: Vec<u64> = self.store.rewards.keys().copied().collect();
        for id in ids {
            let Some(pool) = self.store.rewards.get_mut(&id) else {
                continue;
            };
            coins.extend(&pool.coins);
            pool.vote_periods -= 1;
            if pool.vote_periods == 0 {
                self.store.rewards.remove(&id);
            }
        }
        coins
    }

    /// Split the period's installment across validators in proportion to
    /// reward weight and settle the total against the distribution module.
    ///
    /// When nobody earned reward weight this period the pools stall: the
    /// installment is neither gathered nor decremented, so it carries over
    /// intact.
    pub(crate) fn reward_winners(&mut self, performances: &ValidatorPerformances) {
        let total_reward_weight = performances.total_reward_weight();
        if total_reward_weight == 0 {
            return;
        }

        let total_rewards = self.gather_rewards_for_vote_period();
        let mut distributed = Coins::new();

        for performance in performances.values() {
            if self.staking.validator(&performance.validator).is_none() {
                continue;
            }
            let portion = total_rewards.mul_ratio(performance.reward_weight, total_reward_weight);
            self.distribution
                .allocate_tokens_to_validator(&performance.validator, &portion);
            distributed.extend(&portion);
        }

        let distribution_module = self.distribution_module.clone();
        if let Err(err) =
            self.bank
                .send_coins_module_to_module(MODULE_NAME, &distribution_module, &distributed)
        {
            error!(%err, "failed to settle oracle rewards against the distribution module");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use argus_core::{Coin, ValidatorPerformance};

    fn coins(amount: u128) -> Coins {
        Coins::from_iter([Coin::new("uargus", amount)])
    }

    fn performances_with_weights(weights: &[(u8, i64)]) -> ValidatorPerformances {
        let mut performances = ValidatorPerformances::new();
        for &(seed, weight) in weights {
            let mut performance = ValidatorPerformance::new(100, val_id(seed));
            performance.reward_weight = weight;
            performances.insert(performance);
        }
        performances
    }

    #[test]
    fn test_allocate_rewards_splits_and_transfers() {
        let (mut keeper, mocks) = keeper_with_validators(&[(1, 100)]);

        keeper
            .allocate_rewards("perp", &coins(1_000), 4)
            .unwrap();

        let pool = keeper.store.rewards.get(&0).unwrap();
        assert_eq!(pool.vote_periods, 4);
        assert_eq!(pool.coins.amount_of("uargus"), 250);

        let transfers = mocks.bank.transfers.borrow();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].0, "perp");
        assert_eq!(transfers[0].1, MODULE_NAME);
        assert_eq!(transfers[0].2.amount_of("uargus"), 1_000);
    }

    #[test]
    fn test_allocate_rewards_zero_periods_rejected() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        assert!(matches!(
            keeper.allocate_rewards("perp", &coins(1_000), 0),
            Err(OracleError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_gather_decrements_and_expires_pools() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        keeper.allocate_rewards("perp", &coins(200), 2).unwrap();

        assert_eq!(keeper.gather_rewards_for_vote_period().amount_of("uargus"), 100);
        assert_eq!(keeper.store.rewards.get(&0).unwrap().vote_periods, 1);

        assert_eq!(keeper.gather_rewards_for_vote_period().amount_of("uargus"), 100);
        assert!(keeper.store.rewards.is_empty());

        assert!(keeper.gather_rewards_for_vote_period().is_empty());
    }

    #[test]
    fn test_gather_merges_multiple_pools() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        keeper.allocate_rewards("perp", &coins(100), 1).unwrap();
        keeper.allocate_rewards("spot", &coins(300), 3).unwrap();

        assert_eq!(keeper.gather_rewards_for_vote_period().amount_of("uargus"), 200);
        // the single-period pool is gone, the other keeps paying
        assert_eq!(keeper.store.rewards.len(), 1);
        assert_eq!(keeper.gather_rewards_for_vote_period().amount_of("uargus"), 100);
    }

    #[test]
    fn test_reward_winners_proportional_to_weight() {
        let (mut keeper, mocks) = keeper_with_validators(&[(1, 100), (2, 100)]);
        keeper.allocate_rewards("perp", &coins(900), 1).unwrap();

        let performances = performances_with_weights(&[(1, 200), (2, 100)]);
        keeper.reward_winners(&performances);

        assert_eq!(mocks.distribution.allocated_to(&val_id(1)).amount_of("uargus"), 600);
        assert_eq!(mocks.distribution.allocated_to(&val_id(2)).amount_of("uargus"), 300);

        // settlement transfer covers exactly what was handed out
        let transfers = mocks.bank.transfers.borrow();
        let settlement = transfers.last().unwrap();
        assert_eq!(settlement.0, MODULE_NAME);
        assert_eq!(settlement.1, "distribution");
        assert_eq!(settlement.2.amount_of("uargus"), 900);
    }

    #[test]
    fn test_reward_conservation_with_truncation() {
        let (mut keeper, mocks) = keeper_with_validators(&[(1, 100), (2, 100), (3, 100)]);
        keeper.allocate_rewards("perp", &coins(100), 1).unwrap();

        let performances = performances_with_weights(&[(1, 1), (2, 1), (3, 1)]);
        keeper.reward_winners(&performances);

        let handed_out: u128 = [1u8, 2, 3]
            .iter()
            .map(|&seed| mocks.distribution.allocated_to(&val_id(seed)).amount_of("uargus"))
            .sum();
        // 100/3 truncates to 33 per validator, dust stays in the module
        assert_eq!(handed_out, 99);
        let transfers = mocks.bank.transfers.borrow();
        assert_eq!(transfers.last().unwrap().2.amount_of("uargus"), 99);
    }

    #[test]
    fn test_zero_reward_weight_stalls_pools() {
        let (mut keeper, mocks) = keeper_with_validators(&[(1, 100)]);
        keeper.allocate_rewards("perp", &coins(100), 2).unwrap();

        keeper.reward_winners(&performances_with_weights(&[(1, 0)]));

        // the installment was neither paid nor consumed
        assert_eq!(keeper.store.rewards.get(&0).unwrap().vote_periods, 2);
        assert!(mocks.distribution.allocations.borrow().is_empty());
        // only the funding transfer happened
        assert_eq!(mocks.bank.transfers.borrow().len(), 1);
    }

    #[test]
    fn test_departed_validator_skipped() {
        let (mut keeper, mocks) = keeper_with_validators(&[(1, 100), (2, 100)]);
        keeper.allocate_rewards("perp", &coins(100), 1).unwrap();
        mocks.staking.remove(&val_id(2));

        keeper.reward_winners(&performances_with_weights(&[(1, 1), (2, 1)]));

        assert_eq!(mocks.distribution.allocated_to(&val_id(1)).amount_of("uargus"), 50);
        assert!(mocks.distribution.allocated_to(&val_id(2)).is_empty());
    }
}
