//! # Argus Core
//!
//! Core value types for the Argus validator price oracle.
//!
//! The oracle committee periodically commits, reveals, and aggregates
//! observed exchange rates for a whitelisted set of trading pairs. This crate
//! holds everything the aggregation pipeline computes *over*:
//!
//! - [`Pair`] - a `BASE:QUOTE` trading pair identifier
//! - [`ExchangeRateTuple`] / [`VoteHash`] - the commit/reveal vote payloads
//! - [`ExchangeRateVotes`] - a per-pair ballot with the weighted-median and
//!   standard-deviation math
//! - [`ValidatorPerformance`] - the per-period win/miss/abstain accumulator
//! - [`Params`] - governance-controlled oracle parameters
//! - [`OracleError`] - the recoverable (user-facing) error taxonomy
//!
//! Fatal "should never happen" conditions (corrupted state, missing module
//! account) are not represented here; they abort the enclosing state
//! transition instead of surfacing as an [`OracleError`].

pub mod error;
pub mod pair;
pub mod params;
pub mod types;
pub mod vote;

// Re-exports
pub use error::{OracleError, Result};
pub use pair::Pair;
pub use params::Params;
pub use types::{AccountId, Coin, Coins, DatedPrice, PriceSnapshot, RewardPool, ValidatorId};
pub use vote::{
    canonical_tuples_string, AggregateExchangeRatePrevote, AggregateExchangeRateVote,
    ExchangeRateTuple, ExchangeRateVote, ExchangeRateVotes, ValidatorPerformance,
    ValidatorPerformances, VoteHash,
};
