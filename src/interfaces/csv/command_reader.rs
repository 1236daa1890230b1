use crate::domain::asset::Symbol;
use crate::domain::command::Command;
use crate::domain::identity::Identity;
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Deposit,
    Withdraw,
    Lock,
    LockFrom,
    Charge,
    SetAdmin,
    SetTreasurer,
    SetFeeAddress,
    SetFeeSymbols,
}

/// One row of a commands file: `op, caller, target, symbol, amount, unlock, order_id`.
///
/// `target` is the withdraw destination, the organization of `lock_from` and
/// `charge`, or the new holder for the role setters. `set_fee_symbols` takes a
/// `;`-separated list in `symbol`. A `charge` reads its charged part from
/// `amount` and its unlocked part from `unlock`; one of them may be left empty
/// and counts as zero, but not both.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub op: Operation,
    pub caller: Identity,
    pub target: Option<Identity>,
    pub symbol: Option<String>,
    pub amount: Option<i64>,
    pub unlock: Option<i64>,
    pub order_id: Option<String>,
}

impl CommandRecord {
    /// Splits the row into its caller and the command to run.
    pub fn into_command(self) -> Result<(Identity, Command)> {
        let command = match self.op {
            Operation::Deposit => Command::Deposit {
                symbol: self.symbol()?,
                amount: self.amount()?,
            },
            Operation::Withdraw => Command::Withdraw {
                symbol: self.symbol()?,
                amount: self.amount()?,
                to: self.target()?,
            },
            Operation::Lock => Command::Lock {
                symbol: self.symbol()?,
                amount: self.amount()?,
                order_id: self.order_id.clone().unwrap_or_default(),
            },
            Operation::LockFrom => Command::LockFrom {
                organization: self.target()?,
                symbol: self.symbol()?,
                amount: self.amount()?,
            },
            Operation::Charge => {
                if self.amount.is_none() && self.unlock.is_none() {
                    return Err(self.missing("charge or unlock amount"));
                }
                Command::Charge {
                    organization: self.target()?,
                    symbol: self.symbol()?,
                    charge_amount: self.amount.unwrap_or(0),
                    unlock_amount: self.unlock.unwrap_or(0),
                }
            }
            Operation::SetAdmin => Command::SetAdmin(self.target()?),
            Operation::SetTreasurer => Command::SetTreasurer(self.target()?),
            Operation::SetFeeAddress => Command::SetFeeAddress(self.target()?),
            Operation::SetFeeSymbols => Command::SetFeeSymbols(self.symbol_list()?),
        };
        Ok((self.caller, command))
    }

    fn missing(&self, field: &str) -> LedgerError {
        LedgerError::MalformedCommand(format!("{:?} requires a {field}", self.op))
    }

    fn symbol(&self) -> Result<Symbol> {
        self.symbol
            .as_deref()
            .ok_or_else(|| self.missing("symbol"))?
            .parse()
    }

    fn symbol_list(&self) -> Result<BTreeSet<Symbol>> {
        self.symbol
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .collect()
    }

    fn amount(&self) -> Result<i64> {
        self.amount.ok_or_else(|| self.missing("amount"))
    }

    fn target(&self) -> Result<Identity> {
        self.target.clone().ok_or_else(|| self.missing("target"))
    }
}

/// Reads commands from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating ragged rows.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields each row as `(caller, command)`.
    pub fn commands(self) -> impl Iterator<Item = Result<(Identity, Command)>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|record| record.map_err(LedgerError::from)?.into_command())
    }
}
