//! # Argus Oracle
//!
//! Byzantine-fault-tolerant price oracle state machine. A committee of
//! bonded validators commits, reveals, and aggregates observed exchange
//! rates for a whitelisted set of trading pairs, producing one canonical
//! on-chain price per pair, rewards for well-behaved reporters, and slashing
//! for chronic non-reporters.
//!
//! ## Per-period pipeline
//!
//! Invoked once per vote period by the external block-processing pipeline
//! ([`Keeper::update_exchange_rates`]):
//!
//! ```text
//! votes ──> group by pair ──> validity filter ──> tally (weighted median)
//!                                                   │
//!       refresh whitelist <── clear votes <── rewards & miss counters
//! ```
//!
//! Punitive slashing runs on a separate, longer cadence
//! ([`Keeper::slash_and_reset_miss_counters`]) and reads only the miss
//! counters the pipeline leaves behind.
//!
//! ## Execution model
//!
//! Fully synchronous, single-threaded, deterministic. All state lives in the
//! in-memory [`store::OracleStore`] scoped to the surrounding block
//! execution; iteration order is deterministic everywhere (`BTreeMap`).
//! Unrecoverable invariant violations abort the transition via panic, kept
//! strictly separate from the recoverable [`argus_core::OracleError`] path.

pub mod ballot;
pub mod genesis;
pub mod keeper;
pub mod msgs;
pub mod pipeline;
pub mod providers;
pub mod query;
pub mod reward;
pub mod slash;
pub mod store;
pub mod testing;
pub mod whitelist;

// Re-exports
pub use ballot::{is_passing_vote_threshold, tally};
pub use genesis::GenesisState;
pub use keeper::{BlockContext, Keeper, MODULE_NAME, VALIDATOR_UPDATE_DELAY};
pub use msgs::{MsgDelegateFeedConsent, MsgSubmitPrevote, MsgSubmitVote, MsgUpdateParams};
pub use providers::{
    AccountProvider, BankProvider, DistributionProvider, SlashingProvider, StakingProvider,
    ValidatorInfo,
};
pub use store::OracleStore;
