//! Identity and coin types shared across the oracle.

use crate::pair::Pair;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Operator identity of a validator in the committee.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatorId([u8; 32]);

impl ValidatorId {
    pub fn new(id: [u8; 32]) -> Self {
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The account that is the validator's implicit price feeder when no
    /// delegation is stored.
    pub fn account(&self) -> AccountId {
        AccountId(self.0)
    }
}

impl fmt::Debug for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorId({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

/// A transaction-signing account: a price feeder or the governance authority.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub fn new(id: [u8; 32]) -> Self {
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

/// A single denominated amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: &str, amount: u128) -> Self {
        Self {
            denom: denom.to_string(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A denomination-keyed set of coin amounts. Zero amounts are never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins(BTreeMap<String, u128>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    /// Add a single coin to the set.
    pub fn add(&mut self, coin: Coin) {
        if coin.amount == 0 {
            return;
        }
        *self.0.entry(coin.denom).or_insert(0) += coin.amount;
    }

    /// Add every coin of `other` to the set.
    pub fn extend(&mut self, other: &Coins) {
        for coin in other.iter() {
            self.add(coin);
        }
    }

    /// Divide every amount by `divisor`, truncating. The remainder is
    /// accepted dust loss, not corrected.
    pub fn quo(&self, divisor: u64) -> Coins {
        let mut out = Coins::new();
        for (denom, amount) in &self.0 {
            out.add(Coin::new(denom, amount / divisor as u128));
        }
        out
    }

    /// Scale every amount by `numerator / denominator`, truncating.
    ///
    /// Both terms must be non-negative; callers pass reward weights, which
    /// are never negative.
    pub fn mul_ratio(&self, numerator: i64, denominator: i64) -> Coins {
        let mut out = Coins::new();
        if numerator <= 0 || denominator <= 0 {
            return out;
        }
        for (denom, amount) in &self.0 {
            out.add(Coin::new(
                denom,
                amount * numerator as u128 / denominator as u128,
            ));
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0
            .iter()
            .map(|(denom, amount)| Coin::new(denom, *amount))
    }
}

impl FromIterator<Coin> for Coins {
    fn from_iter<I: IntoIterator<Item = Coin>>(iter: I) -> Self {
        let mut coins = Coins::new();
        for coin in iter {
            coins.add(coin);
        }
        coins
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// The canonical consensus price for a pair, stamped with its creation point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatedPrice {
    pub exchange_rate: Decimal,

    /// Block height the price was written at.
    pub created_block: u64,

    /// Block time the price was written at, unix milliseconds.
    pub created_time_ms: i64,
}

/// Append-only price observation used for TWAP range queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub pair: Pair,
    pub price: Decimal,
    pub timestamp_ms: i64,
}

/// A decaying reward pool paid out over a number of vote periods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    pub id: u64,

    /// Vote periods left before the pool is exhausted.
    pub vote_periods: u64,

    /// The per-period installment.
    pub coins: Coins,
}
