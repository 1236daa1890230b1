use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque fungible-asset identifier, e.g. `ELF` or `USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LedgerError::InvalidSymbol(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// A strictly positive quantity of some asset.
///
/// Raw inputs are signed 64-bit integers; anything `<= 0` is rejected at
/// construction, so transitions taking an `Amount` never see a non-positive
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a charge splits locked funds: `charge` goes to the fee address,
/// `unlock` returns to the spendable balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    charge: i64,
    unlock: i64,
    total: i64,
}

impl Settlement {
    pub fn new(charge: i64, unlock: i64) -> Result<Self> {
        if charge < 0 || unlock < 0 || (charge == 0 && unlock == 0) {
            return Err(LedgerError::InvalidChargeParameters {
                charge_amount: charge,
                unlock_amount: unlock,
            });
        }
        let total = charge
            .checked_add(unlock)
            .ok_or(LedgerError::Overflow("summing charge and unlock amounts"))?;
        Ok(Self {
            charge,
            unlock,
            total,
        })
    }

    pub fn charge(&self) -> i64 {
        self.charge
    }

    pub fn unlock(&self) -> i64 {
        self.unlock
    }

    /// Amount leaving the locked balance.
    pub fn total(&self) -> i64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert_eq!(Amount::new(1).unwrap().value(), 1);
        assert!(matches!(Amount::new(0), Err(LedgerError::InvalidAmount(0))));
        assert!(matches!(
            Amount::new(-5),
            Err(LedgerError::InvalidAmount(-5))
        ));
    }

    #[test]
    fn test_amount_deserialization_validates() {
        let ok: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(ok.value(), 42);
        assert!(serde_json::from_str::<Amount>("0").is_err());
    }

    #[test]
    fn test_symbol_parse() {
        assert_eq!(" ELF ".parse::<Symbol>().unwrap(), Symbol::new("ELF"));
        assert!(matches!(
            "  ".parse::<Symbol>(),
            Err(LedgerError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_settlement_validation() {
        let s = Settlement::new(3, 2).unwrap();
        assert_eq!((s.charge(), s.unlock(), s.total()), (3, 2, 5));

        assert!(Settlement::new(0, 2).is_ok());
        assert!(Settlement::new(3, 0).is_ok());
        for (charge, unlock) in [(0, 0), (-1, 2), (2, -1)] {
            assert!(matches!(
                Settlement::new(charge, unlock),
                Err(LedgerError::InvalidChargeParameters { .. })
            ));
        }
        assert!(matches!(
            Settlement::new(i64::MAX, 1),
            Err(LedgerError::Overflow(_))
        ));
    }
}
