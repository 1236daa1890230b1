//! Text formats the ledger is driven through: commands in, balances out.

pub mod csv;
