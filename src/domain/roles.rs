use super::asset::Symbol;
use super::identity::Identity;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A privileged role an operation can demand of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Treasurer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Treasurer => f.write_str("treasurer"),
        }
    }
}

/// The singleton configuration of the ledger.
///
/// Set once by `Initialize`; afterwards only the current admin can replace any
/// field, including the admin itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub admin: Identity,
    pub treasurer: Identity,
    pub fee_address: Identity,
    pub fee_symbols: BTreeSet<Symbol>,
}

impl Roles {
    pub fn holder(&self, role: Role) -> &Identity {
        match role {
            Role::Admin => &self.admin,
            Role::Treasurer => &self.treasurer,
        }
    }

    /// Rejects `caller` unless it currently holds `role`.
    pub fn require(&self, role: Role, caller: &Identity, operation: &'static str) -> Result<()> {
        if self.holder(role) == caller {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                operation,
                required: role,
            })
        }
    }

    pub fn accepts(&self, symbol: &Symbol) -> bool {
        self.fee_symbols.contains(symbol)
    }
}
