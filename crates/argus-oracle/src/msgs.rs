//! Transaction messages and their handlers.
//!
//! The commit/reveal flow: a feeder first submits a [`MsgSubmitPrevote`]
//! carrying only a hash, then reveals the salted tuples with a
//! [`MsgSubmitVote`] in the following vote period. Reveal-time validation
//! (hash match, reveal window, whitelisted pairs) is what makes front-running
//! another validator's observation useless.

use crate::keeper::{BlockContext, Keeper};
use argus_core::{
    AccountId, AggregateExchangeRatePrevote, AggregateExchangeRateVote, ExchangeRateTuple,
    OracleError, Params, Result, ValidatorId, VoteHash,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Commit a hashed exchange-rate observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MsgSubmitPrevote {
    pub feeder: AccountId,
    pub validator: ValidatorId,
    pub hash: VoteHash,
}

/// Reveal the tuples behind the previous period's commitment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MsgSubmitVote {
    pub feeder: AccountId,
    pub validator: ValidatorId,
    pub salt: String,
    pub tuples: Vec<ExchangeRateTuple>,
}

/// Delegate feed submission rights to another account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MsgDelegateFeedConsent {
    pub validator: ValidatorId,
    pub delegate: AccountId,
}

/// Governance parameter update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MsgUpdateParams {
    pub authority: AccountId,
    pub params: Params,
}

impl Keeper {
    /// Store a commitment. A second prevote in the same period silently
    /// replaces the first; only the latest commitment can be revealed.
    pub fn submit_prevote(&mut self, ctx: &BlockContext, msg: &MsgSubmitPrevote) -> Result<()> {
        self.validate_feeder(&msg.feeder, &msg.validator)?;

        self.store.prevotes.insert(
            msg.validator,
            AggregateExchangeRatePrevote {
                hash: msg.hash,
                voter: msg.validator,
                submit_block: ctx.height,
            },
        );
        debug!(validator = %msg.validator, hash = %msg.hash, "aggregate prevote");
        Ok(())
    }

    /// Reveal a vote against the stored commitment.
    ///
    /// The reveal must land in the vote period immediately after the
    /// commitment's period, hash to the committed value, and name only
    /// whitelisted pairs. The prevote is left in place; the period-end
    /// cleanup retires it.
    pub fn submit_vote(&mut self, ctx: &BlockContext, msg: &MsgSubmitVote) -> Result<()> {
        self.validate_feeder(&msg.feeder, &msg.validator)?;

        let revealed_hash = VoteHash::from_parts(&msg.salt, &msg.tuples, &msg.validator);
        let prevote = self
            .store
            .prevotes
            .get(&msg.validator)
            .cloned()
            .ok_or(OracleError::NoAggregatePrevote(msg.validator))?;

        let vote_period = self.store.params.vote_period;
        let prevote_period = prevote.submit_block / vote_period;
        let current_period = ctx.height / vote_period;
        if current_period != prevote_period + 1 {
            return Err(OracleError::RevealWindowMismatch {
                prevote_period,
                current_period,
            });
        }

        if revealed_hash != prevote.hash {
            return Err(OracleError::InvalidHash {
                expected: prevote.hash.to_hex(),
                got: revealed_hash.to_hex(),
            });
        }

        for tuple in &msg.tuples {
            tuple.pair.validate()?;
            if !self.store.whitelisted_pairs.contains(&tuple.pair) {
                return Err(OracleError::UnknownPair(tuple.pair.clone()));
            }
        }

        self.store.votes.insert(
            msg.validator,
            AggregateExchangeRateVote {
                tuples: msg.tuples.clone(),
                voter: msg.validator,
            },
        );
        debug!(validator = %msg.validator, tuples = msg.tuples.len(), "aggregate vote");
        Ok(())
    }

    /// Record a feeder delegation for a known validator.
    pub fn delegate_feed_consent(&mut self, msg: &MsgDelegateFeedConsent) -> Result<()> {
        if self.staking.validator(&msg.validator).is_none() {
            return Err(OracleError::UnknownValidator(msg.validator));
        }
        self.store
            .feeder_delegations
            .insert(msg.validator, msg.delegate);
        Ok(())
    }

    /// Replace the oracle params. Only the wired governance authority may.
    pub fn update_params(&mut self, msg: &MsgUpdateParams) -> Result<()> {
        if msg.authority != self.authority {
            return Err(OracleError::Unauthorized {
                expected: self.authority.to_string(),
                got: msg.authority.to_string(),
            });
        }
        msg.params.validate()?;
        self.store.params = msg.params.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use argus_core::Pair;
    use rust_decimal_macros::dec;

    fn tuples() -> Vec<ExchangeRateTuple> {
        vec![ExchangeRateTuple::new(
            Pair::new("ubtc", "uusd"),
            dec!(42000),
        )]
    }

    fn commit(keeper: &mut crate::Keeper, seed: u8, salt: &str, height: u64) {
        let msg = MsgSubmitPrevote {
            feeder: val_id(seed).account(),
            validator: val_id(seed),
            hash: VoteHash::from_parts(salt, &tuples(), &val_id(seed)),
        };
        keeper
            .submit_prevote(&BlockContext::new(height, 0), &msg)
            .unwrap();
    }

    fn reveal_msg(seed: u8, salt: &str) -> MsgSubmitVote {
        MsgSubmitVote {
            feeder: val_id(seed).account(),
            validator: val_id(seed),
            salt: salt.to_string(),
            tuples: tuples(),
        }
    }

    #[test]
    fn test_commit_reveal_roundtrip() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        commit(&mut keeper, 1, "salt", 0);

        keeper
            .submit_vote(&BlockContext::new(1, 0), &reveal_msg(1, "salt"))
            .unwrap();

        assert!(keeper.store.votes.contains_key(&val_id(1)));
        // the prevote stays until period-end cleanup
        assert!(keeper.store.prevotes.contains_key(&val_id(1)));
    }

    #[test]
    fn test_reveal_in_same_period_rejected() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        keeper.store.params.vote_period = 10;
        commit(&mut keeper, 1, "salt", 3);

        let err = keeper
            .submit_vote(&BlockContext::new(7, 0), &reveal_msg(1, "salt"))
            .unwrap_err();
        assert!(matches!(err, OracleError::RevealWindowMismatch { .. }));
    }

    #[test]
    fn test_reveal_two_periods_late_rejected() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        commit(&mut keeper, 1, "salt", 0);

        let err = keeper
            .submit_vote(&BlockContext::new(2, 0), &reveal_msg(1, "salt"))
            .unwrap_err();
        assert!(matches!(err, OracleError::RevealWindowMismatch { .. }));
    }

    #[test]
    fn test_reveal_wrong_salt_rejected() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        commit(&mut keeper, 1, "salt", 0);

        let err = keeper
            .submit_vote(&BlockContext::new(1, 0), &reveal_msg(1, "other salt"))
            .unwrap_err();
        assert!(matches!(err, OracleError::InvalidHash { .. }));
    }

    #[test]
    fn test_reveal_without_prevote_rejected() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let err = keeper
            .submit_vote(&BlockContext::new(1, 0), &reveal_msg(1, "salt"))
            .unwrap_err();
        assert!(matches!(err, OracleError::NoAggregatePrevote(_)));
    }

    #[test]
    fn test_reveal_non_whitelisted_pair_rejected() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let rogue = vec![ExchangeRateTuple::new(
            Pair::new("udoge", "uusd"),
            dec!(0.1),
        )];
        let msg = MsgSubmitPrevote {
            feeder: val_id(1).account(),
            validator: val_id(1),
            hash: VoteHash::from_parts("salt", &rogue, &val_id(1)),
        };
        keeper
            .submit_prevote(&BlockContext::new(0, 0), &msg)
            .unwrap();

        let err = keeper
            .submit_vote(
                &BlockContext::new(1, 0),
                &MsgSubmitVote {
                    feeder: val_id(1).account(),
                    validator: val_id(1),
                    salt: "salt".to_string(),
                    tuples: rogue,
                },
            )
            .unwrap_err();
        assert!(matches!(err, OracleError::UnknownPair(_)));
    }

    #[test]
    fn test_second_prevote_replaces_first() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        commit(&mut keeper, 1, "first", 0);
        commit(&mut keeper, 1, "second", 0);

        assert!(keeper
            .submit_vote(&BlockContext::new(1, 0), &reveal_msg(1, "first"))
            .is_err());
        assert!(keeper
            .submit_vote(&BlockContext::new(1, 0), &reveal_msg(1, "second"))
            .is_ok());
    }

    #[test]
    fn test_delegated_feeder_may_submit() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        keeper
            .delegate_feed_consent(&MsgDelegateFeedConsent {
                validator: val_id(1),
                delegate: acct_id(50),
            })
            .unwrap();

        let msg = MsgSubmitPrevote {
            feeder: acct_id(50),
            validator: val_id(1),
            hash: VoteHash::from_parts("salt", &tuples(), &val_id(1)),
        };
        assert!(keeper.submit_prevote(&BlockContext::new(0, 0), &msg).is_ok());

        // once delegated, the delegation is what is checked for strangers
        let stranger = MsgSubmitPrevote {
            feeder: acct_id(51),
            validator: val_id(1),
            hash: VoteHash::from_parts("salt", &tuples(), &val_id(1)),
        };
        assert!(matches!(
            keeper.submit_prevote(&BlockContext::new(0, 0), &stranger),
            Err(OracleError::NoVotingPermission { .. })
        ));
    }

    #[test]
    fn test_delegate_consent_unknown_validator() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let err = keeper
            .delegate_feed_consent(&MsgDelegateFeedConsent {
                validator: val_id(9),
                delegate: acct_id(50),
            })
            .unwrap_err();
        assert!(matches!(err, OracleError::UnknownValidator(_)));
    }

    #[test]
    fn test_update_params_authority_checked() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let params = keeper.params();

        let err = keeper
            .update_params(&MsgUpdateParams {
                authority: acct_id(7),
                params: params.clone(),
            })
            .unwrap_err();
        assert!(matches!(err, OracleError::Unauthorized { .. }));

        assert!(keeper
            .update_params(&MsgUpdateParams {
                authority: test_authority(),
                params,
            })
            .is_ok());
    }

    #[test]
    fn test_update_params_rejects_invalid() {
        let (mut keeper, _) = keeper_with_validators(&[(1, 100)]);
        let mut params = keeper.params();
        params.vote_period = 0;

        let err = keeper
            .update_params(&MsgUpdateParams {
                authority: test_authority(),
                params,
            })
            .unwrap_err();
        assert!(matches!(err, OracleError::InvalidParams(_)));
    }
}
