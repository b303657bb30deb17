//! Deterministic in-memory collaborators for tests.
//!
//! Each mock hands out `Rc<RefCell<_>>` handles so a test can keep observing
//! (and mutating) provider state after the boxed copy moves into the keeper.

use crate::keeper::Keeper;
use crate::providers::{
    AccountProvider, BankProvider, DistributionProvider, SlashingProvider, StakingProvider,
    ValidatorInfo,
};
use argus_core::{AccountId, Coins, Pair, Params, Result, ValidatorId};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub fn val_id(n: u8) -> ValidatorId {
    ValidatorId::new([n; 32])
}

pub fn acct_id(n: u8) -> AccountId {
    AccountId::new([n; 32])
}

/// A bonded, unjailed validator with the given power.
pub fn bonded(n: u8, power: i64) -> ValidatorInfo {
    ValidatorInfo {
        operator: val_id(n),
        power,
        bonded: true,
        jailed: false,
    }
}

#[derive(Clone, Default)]
pub struct MockStaking {
    validators: Rc<RefCell<Vec<ValidatorInfo>>>,
}

impl MockStaking {
    pub fn new(validators: Vec<ValidatorInfo>) -> Self {
        Self {
            validators: Rc::new(RefCell::new(validators)),
        }
    }

    pub fn set_bonded(&self, operator: &ValidatorId, is_bonded: bool) {
        for validator in self.validators.borrow_mut().iter_mut() {
            if validator.operator == *operator {
                validator.bonded = is_bonded;
            }
        }
    }

    pub fn set_jailed(&self, operator: &ValidatorId, is_jailed: bool) {
        for validator in self.validators.borrow_mut().iter_mut() {
            if validator.operator == *operator {
                validator.jailed = is_jailed;
            }
        }
    }

    pub fn remove(&self, operator: &ValidatorId) {
        self.validators
            .borrow_mut()
            .retain(|validator| validator.operator != *operator);
    }
}

impl StakingProvider for MockStaking {
    fn validator(&self, operator: &ValidatorId) -> Option<ValidatorInfo> {
        self.validators
            .borrow()
            .iter()
            .find(|validator| validator.operator == *operator)
            .cloned()
    }

    fn total_bonded_power(&self) -> i64 {
        self.validators
            .borrow()
            .iter()
            .filter(|validator| validator.bonded)
            .map(|validator| validator.power)
            .sum()
    }

    fn validators_by_power(&self) -> Vec<ValidatorInfo> {
        let mut validators = self.validators.borrow().clone();
        validators.sort_by(|a, b| b.power.cmp(&a.power).then(a.operator.cmp(&b.operator)));
        validators
    }

    fn max_validators(&self) -> u32 {
        100
    }
}

/// One recorded punitive slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashEvent {
    pub operator: ValidatorId,
    pub fraction: Decimal,
    pub power: i64,
    pub distribution_height: i64,
}

#[derive(Clone, Default)]
pub struct MockSlashing {
    pub slashes: Rc<RefCell<Vec<SlashEvent>>>,
    pub jailed: Rc<RefCell<Vec<ValidatorId>>>,
}

impl SlashingProvider for MockSlashing {
    fn slash(
        &mut self,
        operator: &ValidatorId,
        fraction: Decimal,
        power: i64,
        distribution_height: i64,
    ) {
        self.slashes.borrow_mut().push(SlashEvent {
            operator: *operator,
            fraction,
            power,
            distribution_height,
        });
    }

    fn jail(&mut self, operator: &ValidatorId) {
        self.jailed.borrow_mut().push(*operator);
    }
}

#[derive(Clone, Default)]
pub struct MockDistribution {
    pub allocations: Rc<RefCell<BTreeMap<ValidatorId, Coins>>>,
}

impl MockDistribution {
    pub fn allocated_to(&self, operator: &ValidatorId) -> Coins {
        self.allocations
            .borrow()
            .get(operator)
            .cloned()
            .unwrap_or_default()
    }
}

impl DistributionProvider for MockDistribution {
    fn allocate_tokens_to_validator(&mut self, operator: &ValidatorId, tokens: &Coins) {
        self.allocations
            .borrow_mut()
            .entry(*operator)
            .or_default()
            .extend(tokens);
    }
}

#[derive(Clone, Default)]
pub struct MockBank {
    /// (from, to, coins) per transfer, in call order.
    pub transfers: Rc<RefCell<Vec<(String, String, Coins)>>>,
}

impl BankProvider for MockBank {
    fn send_coins_module_to_module(&mut self, from: &str, to: &str, coins: &Coins) -> Result<()> {
        self.transfers
            .borrow_mut()
            .push((from.to_string(), to.to_string(), coins.clone()));
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockAccounts {
    module_accounts: Vec<String>,
}

impl Default for MockAccounts {
    fn default() -> Self {
        Self {
            module_accounts: vec![
                crate::keeper::MODULE_NAME.to_string(),
                "distribution".to_string(),
            ],
        }
    }
}

impl MockAccounts {
    pub fn empty() -> Self {
        Self {
            module_accounts: Vec::new(),
        }
    }
}

impl AccountProvider for MockAccounts {
    fn has_module_account(&self, name: &str) -> bool {
        self.module_accounts.iter().any(|account| account == name)
    }
}

/// Handles to every mock a [`keeper_with_validators`] keeper talks to.
pub struct MockSuite {
    pub staking: MockStaking,
    pub slashing: MockSlashing,
    pub distribution: MockDistribution,
    pub bank: MockBank,
}

/// The governance authority every test keeper is wired with.
pub fn test_authority() -> AccountId {
    acct_id(200)
}

/// A keeper over a bonded validator set. `validators` pairs a one-byte
/// operator seed with a voting power; whitelist defaults to ubtc:uusd and
/// ueth:uusd with `min_voters` relaxed to 1.
pub fn keeper_with_validators(validators: &[(u8, i64)]) -> (Keeper, MockSuite) {
    let staking = MockStaking::new(
        validators
            .iter()
            .map(|&(seed, power)| bonded(seed, power))
            .collect(),
    );
    let slashing = MockSlashing::default();
    let distribution = MockDistribution::default();
    let bank = MockBank::default();
    let accounts = MockAccounts::default();

    let mut keeper = Keeper::new(
        Box::new(staking.clone()),
        Box::new(slashing.clone()),
        Box::new(distribution.clone()),
        Box::new(bank.clone()),
        &accounts,
        "distribution",
        test_authority(),
    );

    let params = Params {
        whitelist: vec![Pair::new("ubtc", "uusd"), Pair::new("ueth", "uusd")],
        min_voters: 1,
        vote_period: 1,
        ..Params::default()
    };
    keeper.store.params = params.clone();
    keeper.store.whitelisted_pairs = params.whitelist.into_iter().collect();

    (
        keeper,
        MockSuite {
            staking,
            slashing,
            distribution,
            bank,
        },
    )
}
