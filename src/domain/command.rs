use super::asset::Symbol;
use super::identity::Identity;
use std::collections::BTreeSet;

/// A mutating ledger operation, minus its caller.
///
/// Amounts stay raw `i64` here: validation belongs to the engine, so a
/// command replayed from an untrusted source is rejected with the same error
/// a direct call would get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetAdmin(Identity),
    SetTreasurer(Identity),
    SetFeeAddress(Identity),
    SetFeeSymbols(BTreeSet<Symbol>),
    Deposit {
        symbol: Symbol,
        amount: i64,
    },
    Withdraw {
        symbol: Symbol,
        amount: i64,
        to: Identity,
    },
    Lock {
        symbol: Symbol,
        amount: i64,
        order_id: String,
    },
    LockFrom {
        organization: Identity,
        symbol: Symbol,
        amount: i64,
    },
    Charge {
        organization: Identity,
        symbol: Symbol,
        charge_amount: i64,
        unlock_amount: i64,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetAdmin(_) => "set_admin",
            Command::SetTreasurer(_) => "set_treasurer",
            Command::SetFeeAddress(_) => "set_fee_address",
            Command::SetFeeSymbols(_) => "set_fee_symbols",
            Command::Deposit { .. } => "deposit",
            Command::Withdraw { .. } => "withdraw",
            Command::Lock { .. } => "lock",
            Command::LockFrom { .. } => "lock_from",
            Command::Charge { .. } => "charge",
        }
    }
}
