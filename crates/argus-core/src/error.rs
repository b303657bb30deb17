//! Error types for oracle operations.
//!
//! Everything here is a *validation failure*: user-caused, recoverable,
//! surfaced as a failed transaction or query. Soft consensus failures (a
//! ballot missing its thresholds) are not errors at all, and fatal invariant
//! violations abort the state transition instead of appearing here.

use crate::pair::Pair;
use crate::types::ValidatorId;
use thiserror::Error;

/// Result type alias for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;

/// Errors that can occur while handling oracle transactions and queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    // === Feeder authorization ===
    /// The sender is neither the validator's account nor its delegate.
    #[error("no voting permission for {validator}: wanted feeder {wanted}, got {got}")]
    NoVotingPermission {
        validator: ValidatorId,
        wanted: String,
        got: String,
    },

    /// The validator is not in the bonded/active set.
    #[error("validator {0} is not in the active set")]
    ValidatorNotBonded(ValidatorId),

    /// The validator is unknown to the staking provider.
    #[error("unknown validator: {0}")]
    UnknownValidator(ValidatorId),

    // === Commit/reveal ===
    /// The reveal does not match the stored commitment (or none is stored).
    #[error("hash verification failed: expected {expected}, got {got}")]
    InvalidHash { expected: String, got: String },

    /// A vote is only valid in the period immediately following its
    /// commitment's period.
    #[error("reveal window mismatch: prevote period {prevote_period}, current period {current_period}")]
    RevealWindowMismatch {
        prevote_period: u64,
        current_period: u64,
    },

    /// A revealed tuple names a pair outside the current vote-target set.
    #[error("unknown pair: {0}")]
    UnknownPair(Pair),

    /// No outstanding prevote stored for the validator.
    #[error("no aggregate prevote for {0}")]
    NoAggregatePrevote(ValidatorId),

    /// No outstanding vote stored for the validator.
    #[error("no aggregate vote for {0}")]
    NoAggregateVote(ValidatorId),

    // === Pairs and prices ===
    /// Malformed `BASE:QUOTE` identifier.
    #[error("invalid token pair: {0}")]
    InvalidPair(String),

    /// No consensus price registered for the pair.
    #[error("no exchange rate for pair: {0}")]
    NoPrice(Pair),

    /// No snapshots inside the TWAP lookback window.
    #[error("no valid TWAP: {0}")]
    NoValidTwap(String),

    // === Governance ===
    /// Parameter update failed basic-sanity validation.
    #[error("invalid oracle params: {0}")]
    InvalidParams(String),

    /// Sender is not the designated governance authority.
    #[error("unauthorized: expected {expected}, got {got}")]
    Unauthorized { expected: String, got: String },

    // === General ===
    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
