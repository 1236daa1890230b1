use super::asset::{Amount, Settlement, Symbol};
use super::identity::Identity;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// The two counters held for one (owner, symbol) pair.
///
/// `balance` is spendable: it can be withdrawn or locked. `locked_balance` is
/// escrowed and only leaves through a settlement. Both are non-negative at all
/// times; every transition computes its new counters with checked arithmetic
/// before assigning either, so a rejected transition leaves the record
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub owner: Identity,
    pub symbol: Symbol,
    pub balance: i64,
    pub locked_balance: i64,
}

impl LedgerAccount {
    pub fn new(owner: Identity, symbol: Symbol) -> Self {
        Self {
            owner,
            symbol,
            balance: 0,
            locked_balance: 0,
        }
    }

    /// `balance + locked_balance`, or `None` if it does not fit in 64 bits.
    pub fn total(&self) -> Option<i64> {
        self.balance.checked_add(self.locked_balance)
    }

    /// Credits the spendable balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount.value())
            .ok_or(LedgerError::Overflow("crediting a deposit"))?;
        Ok(())
    }

    /// Debits the spendable balance if sufficient.
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.debit_balance(amount)?;
        Ok(())
    }

    /// Moves funds from spendable to locked.
    pub fn lock(&mut self, amount: Amount) -> Result<()> {
        let balance = self.debit_balance(amount)?;
        let locked_balance = self
            .locked_balance
            .checked_add(amount.value())
            .ok_or(LedgerError::Overflow("locking funds"))?;
        self.balance = balance;
        self.locked_balance = locked_balance;
        Ok(())
    }

    /// Releases locked funds: the unlock part returns to the spendable
    /// balance, the charge part leaves the account entirely.
    pub fn settle(&mut self, settlement: Settlement) -> Result<()> {
        if self.locked_balance < settlement.total() {
            return Err(LedgerError::InsufficientLockedBalance {
                owner: self.owner.clone(),
                symbol: self.symbol.to_string(),
                available: self.locked_balance,
                requested: settlement.total(),
            });
        }
        let balance = self
            .balance
            .checked_add(settlement.unlock())
            .ok_or(LedgerError::Overflow("unlocking funds"))?;
        self.locked_balance -= settlement.total();
        self.balance = balance;
        Ok(())
    }

    fn debit_balance(&self, amount: Amount) -> Result<i64> {
        if self.balance < amount.value() {
            return Err(LedgerError::InsufficientBalance {
                owner: self.owner.clone(),
                symbol: self.symbol.to_string(),
                available: self.balance,
                requested: amount.value(),
            });
        }
        Ok(self.balance - amount.value())
    }
}

/// What `GetBalance` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceView {
    pub balance: i64,
    pub locked_balance: i64,
}

impl From<&LedgerAccount> for BalanceView {
    fn from(account: &LedgerAccount) -> Self {
        Self {
            balance: account.balance,
            locked_balance: account.locked_balance,
        }
    }
}
