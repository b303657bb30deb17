//! Commit/reveal vote payloads and ballot math.
//!
//! A validator first commits a [`VoteHash`] (the prevote), then reveals the
//! salted [`ExchangeRateTuple`] set in the following vote period. Revealed
//! votes are flattened into per-pair [`ExchangeRateVotes`] ballots, which
//! carry the weighted-median and standard-deviation math the tally engine
//! runs on.

use crate::pair::Pair;
use crate::types::ValidatorId;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One observed exchange rate for one pair.
///
/// A non-positive rate encodes an explicit abstention for the pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTuple {
    pub pair: Pair,
    pub exchange_rate: Decimal,
}

impl ExchangeRateTuple {
    pub fn new(pair: Pair, exchange_rate: Decimal) -> Self {
        Self {
            pair,
            exchange_rate,
        }
    }
}

/// Canonical serialization of a tuple multiset: sorted by pair, rates
/// normalized, `pair:rate` entries joined by commas.
///
/// Two honest actors independently constructing commitments for the same
/// intent must hash identically, so ordering and trailing zeros cannot leak
/// into the payload.
pub fn canonical_tuples_string(tuples: &[ExchangeRateTuple]) -> String {
    let mut sorted: Vec<&ExchangeRateTuple> = tuples.iter().collect();
    sorted.sort_by(|a, b| a.pair.cmp(&b.pair));
    sorted
        .iter()
        .map(|t| format!("{}:{}", t.pair, t.exchange_rate.normalize()))
        .collect::<Vec<String>>()
        .join(",")
}

/// The opaque commitment a validator submits ahead of its reveal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteHash([u8; 32]);

impl VoteHash {
    pub fn new(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Compute the commitment for a `(salt, tuples, voter)` reveal.
    pub fn from_parts(salt: &str, tuples: &[ExchangeRateTuple], voter: &ValidatorId) -> Self {
        let payload = format!(
            "{}:{}:{}",
            salt,
            canonical_tuples_string(tuples),
            voter.to_hex()
        );
        Self(*blake3::hash(payload.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for VoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoteHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for VoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// A stored commitment: one live prevote per validator at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateExchangeRatePrevote {
    pub hash: VoteHash,
    pub voter: ValidatorId,

    /// Block height the commitment was submitted at.
    pub submit_block: u64,
}

/// A stored reveal: the disclosed tuples matching a prior commitment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateExchangeRateVote {
    pub tuples: Vec<ExchangeRateTuple>,
    pub voter: ValidatorId,
}

/// The flattened projection of one validator's vote on one pair, tagged with
/// the validator's voting power. Abstentions carry zero power.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateVote {
    pub pair: Pair,
    pub exchange_rate: Decimal,
    pub voter: ValidatorId,
    pub power: i64,
}

impl ExchangeRateVote {
    pub fn new(exchange_rate: Decimal, pair: Pair, voter: ValidatorId, power: i64) -> Self {
        Self {
            pair,
            exchange_rate,
            voter,
            power,
        }
    }
}

/// The ballot for a single pair: every retained vote for it in one period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateVotes(Vec<ExchangeRateVote>);

impl ExchangeRateVotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, vote: ExchangeRateVote) {
        self.0.push(vote);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExchangeRateVote> {
        self.0.iter()
    }

    /// Total voting power behind the ballot.
    pub fn power(&self) -> i64 {
        self.0.iter().map(|v| v.power).sum()
    }

    /// Number of distinct voters with positive power (abstentions excluded).
    pub fn num_valid_voters(&self) -> u64 {
        self.0
            .iter()
            .filter(|v| v.power > 0)
            .map(|v| v.voter)
            .collect::<BTreeSet<ValidatorId>>()
            .len() as u64
    }

    /// The rate at which cumulative voting power first reaches half of total
    /// power, over votes sorted by rate ascending.
    ///
    /// Ballots with zero total power never reach the tally engine; hitting
    /// one here is corrupted state and aborts the transition.
    pub fn weighted_median(&self) -> Decimal {
        let total_power = self.power();
        if total_power <= 0 {
            panic!("weighted median over ballot with no voting power");
        }

        let mut sorted = self.0.clone();
        sorted.sort_by(|a, b| a.exchange_rate.cmp(&b.exchange_rate));

        let mut pivot = 0i64;
        for vote in &sorted {
            pivot += vote.power;
            if pivot >= total_power / 2 {
                return vote.exchange_rate;
            }
        }
        // cumulative power reaches total_power, which is >= total_power / 2
        unreachable!("weighted median must land on a vote")
    }

    /// Population standard deviation of the raw rates around `median`
    /// (power-unweighted). Overflow in the squared deviations degrades to
    /// zero rather than aborting.
    pub fn standard_deviation(&self, median: Decimal) -> Decimal {
        if self.0.is_empty() {
            return Decimal::ZERO;
        }

        let mut sum = Decimal::ZERO;
        for vote in &self.0 {
            let deviation = match vote.exchange_rate.checked_sub(median) {
                Some(d) => d,
                None => return Decimal::ZERO,
            };
            let squared = match deviation.checked_mul(deviation) {
                Some(s) => s,
                None => return Decimal::ZERO,
            };
            sum = match sum.checked_add(squared) {
                Some(s) => s,
                None => return Decimal::ZERO,
            };
        }

        let variance = sum / Decimal::from(self.0.len() as u64);
        variance.sqrt().unwrap_or(Decimal::ZERO)
    }
}

impl From<Vec<ExchangeRateVote>> for ExchangeRateVotes {
    fn from(votes: Vec<ExchangeRateVote>) -> Self {
        Self(votes)
    }
}

impl<'a> IntoIterator for &'a ExchangeRateVotes {
    type Item = &'a ExchangeRateVote;
    type IntoIter = std::slice::Iter<'a, ExchangeRateVote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-period tally accumulator for one validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorPerformance {
    pub validator: ValidatorId,

    /// Consensus voting power this period.
    pub power: i64,

    /// Power-weighted credit for votes inside the reward band.
    pub reward_weight: i64,

    pub win_count: i64,
    pub abstain_count: i64,
    pub miss_count: i64,
}

impl ValidatorPerformance {
    pub fn new(power: i64, validator: ValidatorId) -> Self {
        Self {
            validator,
            power,
            reward_weight: 0,
            win_count: 0,
            abstain_count: 0,
            miss_count: 0,
        }
    }
}

/// The shared mutable accumulator carried through one period's pipeline,
/// rebuilt fresh from the bonded validator set each period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorPerformances(BTreeMap<ValidatorId, ValidatorPerformance>);

impl ValidatorPerformances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, performance: ValidatorPerformance) {
        self.0.insert(performance.validator, performance);
    }

    pub fn get(&self, validator: &ValidatorId) -> Option<&ValidatorPerformance> {
        self.0.get(validator)
    }

    pub fn get_mut(&mut self, validator: &ValidatorId) -> Option<&mut ValidatorPerformance> {
        self.0.get_mut(validator)
    }

    pub fn contains(&self, validator: &ValidatorId) -> bool {
        self.0.contains_key(validator)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &ValidatorPerformance> {
        self.0.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut ValidatorPerformance> {
        self.0.values_mut()
    }

    /// Sum of reward weights across all validators this period.
    pub fn total_reward_weight(&self) -> i64 {
        self.0.values().map(|p| p.reward_weight).sum()
    }
}
