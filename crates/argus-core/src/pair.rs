//! Trading pair identifiers
//!
//! A [`Pair`] is written `BASE:QUOTE` (e.g. `ubtc:uusd`) and is a pure value
//! type: equality is string equality, and both denominations must be
//! independently valid.

use crate::error::{OracleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the base and quote denominations.
const PAIR_SEPARATOR: char = ':';

/// A whitelistable trading pair, `BASE:QUOTE`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pair(String);

impl Pair {
    /// Build a pair from its two denominations. No validation is performed;
    /// use [`Pair::try_new`] when the input is untrusted.
    pub fn new(base: &str, quote: &str) -> Self {
        Self(format!("{base}{PAIR_SEPARATOR}{quote}"))
    }

    /// Parse and validate a `BASE:QUOTE` string.
    pub fn try_new(raw: &str) -> Result<Self> {
        let pair = Self(raw.to_string());
        pair.validate()?;
        Ok(pair)
    }

    /// Base denomination (the priced asset).
    pub fn base_denom(&self) -> &str {
        self.0.split(PAIR_SEPARATOR).next().unwrap_or_default()
    }

    /// Quote denomination (the unit of account).
    pub fn quote_denom(&self) -> &str {
        self.0.split(PAIR_SEPARATOR).nth(1).unwrap_or_default()
    }

    /// The pair with base and quote swapped.
    pub fn inverse(&self) -> Self {
        Self::new(self.quote_denom(), self.base_denom())
    }

    /// Check the `BASE:QUOTE` shape and that both denominations are valid.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(OracleError::InvalidPair("pair is empty".to_string()));
        }

        let parts: Vec<&str> = self.0.split(PAIR_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(OracleError::InvalidPair(format!(
                "pair {} must have exactly two assets, not {}",
                self.0,
                parts.len()
            )));
        }

        validate_denom(parts[0])
            .map_err(|e| OracleError::InvalidPair(format!("invalid base asset: {e}")))?;
        validate_denom(parts[1])
            .map_err(|e| OracleError::InvalidPair(format!("invalid quote asset: {e}")))?;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A denomination must be 2-128 characters, start with a letter, and contain
/// only letters, digits, and `/ . _ -`.
fn validate_denom(denom: &str) -> std::result::Result<(), String> {
    if denom.len() < 2 || denom.len() > 128 {
        return Err(format!("denom length must be 2-128, got {}", denom.len()));
    }
    let mut chars = denom.chars();
    let first = chars.next().unwrap_or(' ');
    if !first.is_ascii_alphabetic() {
        return Err(format!("denom {denom} must start with a letter"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-')) {
        return Err(format!("denom {denom} contains invalid characters"));
    }
    Ok(())
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pair({})", self.0)
    }
}

impl FromStr for Pair {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pair() {
        let pair = Pair::try_new("ubtc:uusd").unwrap();
        assert_eq!(pair.base_denom(), "ubtc");
        assert_eq!(pair.quote_denom(), "uusd");
        assert_eq!(pair.to_string(), "ubtc:uusd");
    }

    #[test]
    fn test_inverse() {
        let pair = Pair::try_new("ueth:uusd").unwrap();
        assert_eq!(pair.inverse(), Pair::new("uusd", "ueth"));
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert!(Pair::try_new("ubtcuusd").is_err());
    }

    #[test]
    fn test_empty_denoms_rejected() {
        assert!(Pair::try_new(":uusd").is_err());
        assert!(Pair::try_new("ubtc:").is_err());
        assert!(Pair::try_new("").is_err());
    }

    #[test]
    fn test_three_assets_rejected() {
        assert!(Pair::try_new("ubtc:uusd:ueth").is_err());
    }

    #[test]
    fn test_denom_charset() {
        assert!(Pair::try_new("ibc/ABC123:uusd").is_ok());
        assert!(Pair::try_new("ibc-0.1_x:uusd").is_ok());
        assert!(Pair::try_new("0btc:uusd").is_err());
        assert!(Pair::try_new("ub tc:uusd").is_err());
    }

    #[test]
    fn test_equality_is_string_equality() {
        assert_eq!(Pair::new("ubtc", "uusd"), Pair::try_new("ubtc:uusd").unwrap());
        assert_ne!(Pair::new("ubtc", "uusd"), Pair::new("uusd", "ubtc"));
    }
}
