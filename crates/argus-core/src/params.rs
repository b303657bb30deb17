//! Governance-controlled oracle parameters.

use crate::error::{OracleError, Result};
use crate::pair::Pair;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Oracle module parameters. Mutated only through a governance parameter
/// update, and every mutation must pass [`Params::validate`] first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Number of blocks in one vote period.
    pub vote_period: u64,

    /// Fraction of total bonded power a pair's ballot must gather to pass.
    pub vote_threshold: Decimal,

    /// Fractional tolerance around the weighted median inside which a vote
    /// is rewarded.
    pub reward_band: Decimal,

    /// The administratively configured set of votable pairs.
    pub whitelist: Vec<Pair>,

    /// Stake fraction cut from chronic non-reporters.
    pub slash_fraction: Decimal,

    /// Length in blocks of the reliability evaluation window.
    pub slash_window: u64,

    /// Minimum valid-vote ratio a validator must keep over a slash window.
    pub min_valid_per_window: Decimal,

    /// Minimum count of distinct positive-power voters for a ballot to pass.
    pub min_voters: u64,

    /// TWAP lookback window, milliseconds.
    pub twap_lookback_window_ms: i64,

    /// Share of collected fees routed to validators. Reserved for the fee
    /// pipeline; the aggregation core only validates it.
    pub validator_fee_ratio: Decimal,

    /// A price older than this many blocks expires even without a new ballot.
    pub expiration_blocks: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            vote_period: 30,
            vote_threshold: dec!(0.5),
            reward_band: dec!(0.02),
            whitelist: Vec::new(),
            slash_fraction: dec!(0.005),
            slash_window: 3600,
            min_valid_per_window: dec!(0.69),
            min_voters: 4,
            twap_lookback_window_ms: 15 * 60 * 1000,
            validator_fee_ratio: dec!(0.05),
            expiration_blocks: 900,
        }
    }
}

impl Params {
    /// Basic-sanity validation: non-negative fractions, non-zero limits,
    /// well-formed whitelist pairs.
    pub fn validate(&self) -> Result<()> {
        if self.vote_period == 0 {
            return Err(OracleError::InvalidParams(
                "vote period must be positive".to_string(),
            ));
        }
        if self.vote_threshold < dec!(0.33) || self.vote_threshold > Decimal::ONE {
            return Err(OracleError::InvalidParams(format!(
                "vote threshold must be within [0.33, 1], got {}",
                self.vote_threshold
            )));
        }
        if self.reward_band.is_sign_negative() || self.reward_band > Decimal::ONE {
            return Err(OracleError::InvalidParams(format!(
                "reward band must be within [0, 1], got {}",
                self.reward_band
            )));
        }
        if self.slash_fraction.is_sign_negative() || self.slash_fraction > Decimal::ONE {
            return Err(OracleError::InvalidParams(format!(
                "slash fraction must be within [0, 1], got {}",
                self.slash_fraction
            )));
        }
        if self.slash_window < self.vote_period {
            return Err(OracleError::InvalidParams(format!(
                "slash window ({}) must not be shorter than the vote period ({})",
                self.slash_window, self.vote_period
            )));
        }
        if self.min_valid_per_window.is_sign_negative()
            || self.min_valid_per_window > Decimal::ONE
        {
            return Err(OracleError::InvalidParams(format!(
                "min valid per window must be within [0, 1], got {}",
                self.min_valid_per_window
            )));
        }
        if self.min_voters == 0 {
            return Err(OracleError::InvalidParams(
                "min voters must be positive".to_string(),
            ));
        }
        if self.twap_lookback_window_ms <= 0 {
            return Err(OracleError::InvalidParams(
                "twap lookback window must be positive".to_string(),
            ));
        }
        if self.validator_fee_ratio.is_sign_negative() || self.validator_fee_ratio > Decimal::ONE {
            return Err(OracleError::InvalidParams(format!(
                "validator fee ratio must be within [0, 1], got {}",
                self.validator_fee_ratio
            )));
        }
        if self.expiration_blocks == 0 {
            return Err(OracleError::InvalidParams(
                "expiration blocks must be positive".to_string(),
            ));
        }
        for pair in &self.whitelist {
            pair.validate()?;
        }
        Ok(())
    }
}
