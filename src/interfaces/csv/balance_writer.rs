use crate::domain::account::LedgerAccount;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    owner: String,
    symbol: &'a str,
    balance: i64,
    locked: i64,
}

/// Writes balance records as CSV: `owner,symbol,balance,locked`.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: &[LedgerAccount]) -> Result<()> {
        if accounts.is_empty() {
            self.writer
                .write_record(["owner", "symbol", "balance", "locked"])?;
        }
        for account in accounts {
            self.writer.serialize(BalanceRow {
                owner: account.owner.to_string(),
                symbol: account.symbol.as_str(),
                balance: account.balance,
                locked: account.locked_balance,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
