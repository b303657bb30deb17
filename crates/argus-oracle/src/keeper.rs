//! The oracle keeper: owns the store, wires the collaborator providers, and
//! carries the price store + TWAP logic.

use crate::providers::{
    AccountProvider, BankProvider, DistributionProvider, SlashingProvider, StakingProvider,
};
use crate::store::OracleStore;
use argus_core::{
    AccountId, DatedPrice, ExchangeRateVotes, OracleError, Pair, Params, PriceSnapshot, Result,
    ValidatorId,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::info;

/// Name the oracle module account is registered under.
pub const MODULE_NAME: &str = "oracle";

/// Blocks between a validator-set update and its activation in consensus.
/// Slashing evidence is attributed before the update took effect.
pub const VALIDATOR_UPDATE_DELAY: i64 = 1;

/// The block execution point a keeper call runs at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockContext {
    pub height: u64,

    /// Block time, unix milliseconds.
    pub time_ms: i64,
}

impl BlockContext {
    pub fn new(height: u64, time_ms: i64) -> Self {
        Self { height, time_ms }
    }
}

/// Keeper of the oracle store.
pub struct Keeper {
    pub(crate) store: OracleStore,
    pub(crate) staking: Box<dyn StakingProvider>,
    pub(crate) slashing: Box<dyn SlashingProvider>,
    pub(crate) distribution: Box<dyn DistributionProvider>,
    pub(crate) bank: Box<dyn BankProvider>,

    /// Module name rewards are settled against.
    pub(crate) distribution_module: String,

    /// The governance account allowed to update params.
    pub(crate) authority: AccountId,
}

impl Keeper {
    /// Construct a keeper. Aborts if the oracle module account has not been
    /// registered with the account provider; that is a wiring bug, not a
    /// runtime condition.
    pub fn new(
        staking: Box<dyn StakingProvider>,
        slashing: Box<dyn SlashingProvider>,
        distribution: Box<dyn DistributionProvider>,
        bank: Box<dyn BankProvider>,
        accounts: &dyn AccountProvider,
        distribution_module: &str,
        authority: AccountId,
    ) -> Self {
        if !accounts.has_module_account(MODULE_NAME) {
            panic!("{MODULE_NAME} module account has not been set");
        }

        Self {
            store: OracleStore::new(Params::default()),
            staking,
            slashing,
            distribution,
            bank,
            distribution_module: distribution_module.to_string(),
            authority,
        }
    }

    /// Current oracle params.
    pub fn params(&self) -> Params {
        self.store.params.clone()
    }

    /// Check that `feeder` may submit oracle messages for `validator`.
    ///
    /// A validator delegates feed consent to itself by default, so only
    /// foreign feeder addresses need a stored delegation. The validator must
    /// also be in the bonded set.
    pub fn validate_feeder(&self, feeder: &AccountId, validator: &ValidatorId) -> Result<()> {
        if *feeder != validator.account() {
            let delegate = self
                .store
                .feeder_delegations
                .get(validator)
                .copied()
                .unwrap_or_else(|| validator.account());
            if delegate != *feeder {
                return Err(OracleError::NoVotingPermission {
                    validator: *validator,
                    wanted: delegate.to_string(),
                    got: feeder.to_string(),
                });
            }
        }

        let info = self
            .staking
            .validator(validator)
            .ok_or(OracleError::UnknownValidator(*validator))?;
        if !info.bonded {
            return Err(OracleError::ValidatorNotBonded(*validator));
        }
        Ok(())
    }

    /// Latest consensus price for a pair.
    pub fn get_exchange_rate(&self, pair: &Pair) -> Result<Decimal> {
        self.store
            .exchange_rates
            .get(pair)
            .map(|price| price.exchange_rate)
            .ok_or_else(|| OracleError::NoPrice(pair.clone()))
    }

    /// Write the consensus price for a pair and append a snapshot.
    ///
    /// The dated price is a full overwrite; snapshots are append-only.
    pub fn set_price(&mut self, ctx: &BlockContext, pair: &Pair, price: Decimal) {
        self.store.exchange_rates.insert(
            pair.clone(),
            DatedPrice {
                exchange_rate: price,
                created_block: ctx.height,
                created_time_ms: ctx.time_ms,
            },
        );
        self.store.price_snapshots.insert(
            (pair.clone(), ctx.time_ms),
            PriceSnapshot {
                pair: pair.clone(),
                price,
                timestamp_ms: ctx.time_ms,
            },
        );
        info!(pair = %pair, price = %price, timestamp_ms = ctx.time_ms, "price update");
    }

    /// Time-weighted average price over snapshots in
    /// `(block_time - lookback, block_time]`. Note the open left bracket.
    ///
    /// With a single snapshot its price *is* the TWAP. Otherwise each
    /// snapshot's price holds until the next snapshot's timestamp, the last
    /// one until the current block time.
    pub fn get_exchange_rate_twap(&self, ctx: &BlockContext, pair: &Pair) -> Result<Decimal> {
        let window_start = ctx.time_ms - self.store.params.twap_lookback_window_ms;
        let snapshots: Vec<&PriceSnapshot> = self
            .store
            .price_snapshots
            .range((
                Bound::Excluded((pair.clone(), window_start)),
                Bound::Included((pair.clone(), ctx.time_ms)),
            ))
            .map(|(_, snapshot)| snapshot)
            .collect();

        if snapshots.is_empty() {
            return Err(OracleError::NoValidTwap(format!(
                "no snapshots for pair {pair}"
            )));
        }
        if snapshots.len() == 1 {
            return Ok(snapshots[0].price);
        }

        let first_timestamp_ms = snapshots[0].timestamp_ms;
        if first_timestamp_ms > ctx.time_ms {
            // snapshots are keyed by write time; a future timestamp means the
            // store is corrupted
            panic!(
                "corrupted snapshot state: first timestamp {} is after block time {}",
                first_timestamp_ms, ctx.time_ms
            );
        }
        if first_timestamp_ms == ctx.time_ms {
            return Ok(snapshots[0].price);
        }

        let mut cumulative = Decimal::ZERO;
        for (i, snapshot) in snapshots.iter().enumerate() {
            let next_timestamp_ms = if i == snapshots.len() - 1 {
                ctx.time_ms
            } else {
                snapshots[i + 1].timestamp_ms
            };
            cumulative += snapshot.price * Decimal::from(next_timestamp_ms - snapshot.timestamp_ms);
        }

        Ok(cumulative / Decimal::from(ctx.time_ms - first_timestamp_ms))
    }

    /// Drop dated prices that are about to be rewritten by this period's
    /// tally (`pair_votes` holds a valid ballot for them) or whose age
    /// exceeds the expiration-blocks parameter.
    pub fn clear_exchange_rates(
        &mut self,
        ctx: &BlockContext,
        pair_votes: &BTreeMap<Pair, ExchangeRateVotes>,
    ) {
        let expiration_blocks = self.store.params.expiration_blocks;
        self.store.exchange_rates.retain(|pair, price| {
            let is_valid = pair_votes.contains_key(pair);
            let is_expired = price.created_block + expiration_blocks <= ctx.height;
            !(is_valid || is_expired)
        });
    }

    /// Read access to the store for queries.
    pub fn store(&self) -> &OracleStore {
        &self.store
    }
}
