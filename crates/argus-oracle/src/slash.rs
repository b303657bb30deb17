//! Miss-counter slashing, run once per slash window.
//!
//! A validator whose valid-vote rate over the window falls below the
//! configured minimum is slashed by `slash_fraction` of its power and
//! jailed. Every miss counter is reset afterwards, slashed or not, so each
//! window starts from a clean slate.

use crate::keeper::{BlockContext, Keeper, VALIDATOR_UPDATE_DELAY};
use rust_decimal::Decimal;
use tracing::{error, info};

impl Keeper {
    /// Apply window-end slashing and wipe all miss counters.
    ///
    /// The valid-vote rate is computed with signed arithmetic: a counter
    /// that somehow exceeds the window's period count goes negative and
    /// always slashes rather than wrapping.
    pub fn slash_and_reset_miss_counters(&mut self, ctx: &BlockContext) {
        // evidence height for the slash, predating the validator-set update
        // that took effect this block
        let distribution_height = ctx.height as i64 - VALIDATOR_UPDATE_DELAY - 1;

        let params = self.store.params.clone();
        let vote_periods_per_window = (params.slash_window / params.vote_period) as i64;

        let counters: Vec<_> = self
            .store
            .miss_counters
            .iter()
            .map(|(operator, misses)| (*operator, *misses))
            .collect();

        for (operator, miss_counter) in counters {
            let valid_vote_rate = Decimal::from(vote_periods_per_window - miss_counter as i64)
                / Decimal::from(vote_periods_per_window);

            if valid_vote_rate < params.min_valid_per_window {
                match self.staking.validator(&operator) {
                    Some(validator) if validator.bonded && !validator.jailed => {
                        self.slashing.slash(
                            &operator,
                            params.slash_fraction,
                            validator.power,
                            distribution_height,
                        );
                        info!(
                            validator = %operator,
                            fraction = %params.slash_fraction,
                            misses = miss_counter,
                            "slashing validator for oracle misses"
                        );
                        self.slashing.jail(&operator);
                    }
                    Some(_) => {}
                    None => {
                        error!(validator = %operator, "failed to resolve validator for slashing");
                    }
                }
            }

            self.store.miss_counters.remove(&operator);
        }
    }
}
