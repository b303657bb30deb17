//! Collaborator capability interfaces.
//!
//! The oracle decides *whom* to pay and *whom* to punish; custody, bonding
//! bookkeeping, and slashing mechanics live behind these seams in the
//! surrounding ledger.

use argus_core::{Coins, Result, ValidatorId};
use rust_decimal::Decimal;

/// A validator as seen by the staking provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorInfo {
    pub operator: ValidatorId,

    /// Consensus voting power.
    pub power: i64,

    pub bonded: bool,
    pub jailed: bool,
}

/// Validator set, bonding, and voting-power bookkeeping.
pub trait StakingProvider {
    /// Look up a validator by operator id.
    fn validator(&self, operator: &ValidatorId) -> Option<ValidatorInfo>;

    /// Total bonded consensus power across the validator set.
    fn total_bonded_power(&self) -> i64;

    /// Validators ordered by power, descending. Finite, restartable per
    /// call.
    fn validators_by_power(&self) -> Vec<ValidatorInfo>;

    /// Cap on the active set size.
    fn max_validators(&self) -> u32;
}

/// Punitive slashing and jailing mechanics.
pub trait SlashingProvider {
    fn slash(
        &mut self,
        operator: &ValidatorId,
        fraction: Decimal,
        power: i64,
        distribution_height: i64,
    );

    fn jail(&mut self, operator: &ValidatorId);
}

/// Per-validator reward accrual bookkeeping.
pub trait DistributionProvider {
    fn allocate_tokens_to_validator(&mut self, operator: &ValidatorId, tokens: &Coins);
}

/// Module-to-module coin transfers.
pub trait BankProvider {
    fn send_coins_module_to_module(&mut self, from: &str, to: &str, coins: &Coins) -> Result<()>;
}

/// Module-account existence checks.
pub trait AccountProvider {
    fn has_module_account(&self, name: &str) -> bool;
}
