//! Read-only query surface over the oracle store.

use crate::keeper::{BlockContext, Keeper};
use argus_core::{
    AccountId, AggregateExchangeRatePrevote, AggregateExchangeRateVote, ExchangeRateTuple,
    OracleError, Pair, Result, ValidatorId,
};
use rust_decimal::Decimal;

impl Keeper {
    /// Latest consensus price, shadowing [`Keeper::get_exchange_rate`] under
    /// the query naming.
    pub fn query_exchange_rate(&self, pair: &Pair) -> Result<Decimal> {
        self.get_exchange_rate(pair)
    }

    /// TWAP over the lookback window. Guarded on a live spot price: a pair
    /// whose consensus price expired does not serve a TWAP either, even if
    /// snapshots remain in the window.
    pub fn query_exchange_rate_twap(&self, ctx: &BlockContext, pair: &Pair) -> Result<Decimal> {
        self.get_exchange_rate(pair)?;
        self.get_exchange_rate_twap(ctx, pair)
    }

    /// All current consensus prices as tuples, sorted by pair.
    pub fn query_exchange_rates(&self) -> Vec<ExchangeRateTuple> {
        self.store
            .exchange_rates
            .iter()
            .map(|(pair, price)| ExchangeRateTuple::new(pair.clone(), price.exchange_rate))
            .collect()
    }

    /// Pairs that currently have a consensus price.
    pub fn query_actives(&self) -> Vec<Pair> {
        self.store.exchange_rates.keys().cloned().collect()
    }

    /// The current vote-target whitelist.
    pub fn query_vote_targets(&self) -> Vec<Pair> {
        self.get_whitelisted_pairs()
    }

    /// The feeder authorized for a validator. Falls back to the validator's
    /// own account when no delegation is stored.
    pub fn query_feeder_delegation(&self, validator: &ValidatorId) -> Result<AccountId> {
        if self.staking.validator(validator).is_none() {
            return Err(OracleError::UnknownValidator(*validator));
        }
        Ok(self
            .store
            .feeder_delegations
            .get(validator)
            .copied()
            .unwrap_or_else(|| validator.account()))
    }

    /// Misses accrued in the current slash window; zero when no counter is
    /// stored.
    pub fn query_miss_counter(&self, validator: &ValidatorId) -> u64 {
        self.store.miss_counters.get(validator).copied().unwrap_or(0)
    }

    pub fn query_aggregate_prevote(
        &self,
        validator: &ValidatorId,
    ) -> Result<AggregateExchangeRatePrevote> {
        self.store
            .prevotes
            .get(validator)
            .cloned()
            .ok_or(OracleError::NoAggregatePrevote(*validator))
    }

    pub fn query_aggregate_prevotes(&self) -> Vec<AggregateExchangeRatePrevote> {
        self.store.prevotes.values().cloned().collect()
    }

    pub fn query_aggregate_vote(
        &self,
        validator: &ValidatorId,
    ) -> Result<AggregateExchangeRateVote> {
        self.store
            .votes
            .get(validator)
            .cloned()
            .ok_or(OracleError::NoAggregateVote(*validator))
    }

    pub fn query_aggregate_votes(&self) -> Vec<AggregateExchangeRateVote> {
        self.store.votes.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use rust_decimal_macros::dec;

    fn pair() -> Pair {
        Pair::new("ubtc", "uusd")
    }

    #[test]
    fn test_query_exchange_rates_sorted() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let ctx = BlockContext::new(1, 1_000);
        keeper.set_price(&ctx, &Pair::new("ueth", "uusd"), dec!(2000));
        keeper.set_price(&ctx, &pair(), dec!(42000));

        let rates = keeper.query_exchange_rates();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].pair, pair());
        assert_eq!(keeper.query_actives(), vec![pair(), Pair::new("ueth", "uusd")]);
    }

    #[test]
    fn test_query_twap_requires_live_spot_price() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let ctx = BlockContext::new(1, 1_000);
        keeper.set_price(&ctx, &pair(), dec!(42000));
        // spot price dropped, snapshot remains
        keeper.store.exchange_rates.clear();

        let err = keeper
            .query_exchange_rate_twap(&BlockContext::new(2, 2_000), &pair())
            .unwrap_err();
        assert!(matches!(err, OracleError::NoPrice(_)));
    }

    #[test]
    fn test_query_feeder_delegation_default() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        assert_eq!(
            keeper.query_feeder_delegation(&val_id(1)).unwrap(),
            val_id(1).account()
        );

        keeper
            .store
            .feeder_delegations
            .insert(val_id(1), acct_id(50));
        assert_eq!(
            keeper.query_feeder_delegation(&val_id(1)).unwrap(),
            acct_id(50)
        );

        assert!(keeper.query_feeder_delegation(&val_id(9)).is_err());
    }

    #[test]
    fn test_query_miss_counter_defaults_to_zero() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        assert_eq!(keeper.query_miss_counter(&val_id(1)), 0);
        keeper.store.miss_counters.insert(val_id(1), 7);
        assert_eq!(keeper.query_miss_counter(&val_id(1)), 7);
    }

    #[test]
    fn test_query_aggregate_vote_missing() {
        let (keeper, _) = keeper_with_validators(&[(1, 100)]);
        assert!(matches!(
            keeper.query_aggregate_prevote(&val_id(1)),
            Err(OracleError::NoAggregatePrevote(_))
        ));
        assert!(matches!(
            keeper.query_aggregate_vote(&val_id(1)),
            Err(OracleError::NoAggregateVote(_))
        ));
    }
}
