use super::asset::Symbol;
use super::identity::Identity;
use super::organization::OrganizationMember;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Audit record of one state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum LedgerEvent {
    FeeSymbolSet {
        symbols: BTreeSet<Symbol>,
    },
    OrganizationCreated {
        address: Identity,
        members: Vec<OrganizationMember>,
    },
    Deposited {
        address: Identity,
        symbol: Symbol,
        amount: i64,
    },
    Withdrawn {
        address: Identity,
        symbol: Symbol,
        amount: i64,
        to_address: Identity,
    },
    Locked {
        address: Identity,
        symbol: Symbol,
        amount: i64,
        order_id: String,
    },
    FeeReceived {
        fee_address: Identity,
        symbol: Symbol,
        amount: i64,
        organization: Identity,
    },
    Charged {
        address: Identity,
        symbol: Symbol,
        charged_amount: i64,
        unlocked_amount: i64,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::FeeSymbolSet { .. } => "FeeSymbolSet",
            LedgerEvent::OrganizationCreated { .. } => "OrganizationCreated",
            LedgerEvent::Deposited { .. } => "Deposited",
            LedgerEvent::Withdrawn { .. } => "Withdrawn",
            LedgerEvent::Locked { .. } => "Locked",
            LedgerEvent::FeeReceived { .. } => "FeeReceived",
            LedgerEvent::Charged { .. } => "Charged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::Locked {
            address: Identity::organization("aa"),
            symbol: Symbol::new("ELF"),
            amount: 10,
            order_id: String::new(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Locked");
        assert_eq!(json["address"], "org:aa");
        assert_eq!(json["order_id"], "");
        assert_eq!(event.name(), "Locked");
    }
}
