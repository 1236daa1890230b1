use crate::domain::identity::Identity;
use crate::domain::roles::Role;
use miette::Diagnostic;
use thiserror::Error;

/// Every way an invocation of the ledger can be rejected.
///
/// Rejections are terminal for the invocation that produced them: no state
/// change and no event survives a returned error.
#[derive(Error, Debug, Diagnostic)]
pub enum LedgerError {
    #[error("Already Initialized")]
    #[diagnostic(code(billing::already_initialized))]
    AlreadyInitialized,

    #[error("ledger has not been initialized")]
    #[diagnostic(
        code(billing::not_initialized),
        help("run Initialize with the admin, treasurer, fee address and symbols first")
    )]
    NotInitialized,

    #[error("No Permission: {caller} cannot {operation}, requires {required}")]
    #[diagnostic(code(billing::unauthorized))]
    Unauthorized {
        caller: Identity,
        operation: &'static str,
        required: Role,
    },

    #[error("Invalid symbol: {0}")]
    #[diagnostic(code(billing::invalid_symbol))]
    InvalidSymbol(String),

    #[error("Invalid amount: {0} must be greater than zero")]
    #[diagnostic(code(billing::invalid_amount))]
    InvalidAmount(i64),

    #[error(
        "Invalid charge parameters: charge {charge_amount} and unlock {unlock_amount} must be non-negative and not both 0"
    )]
    #[diagnostic(code(billing::invalid_charge_parameters))]
    InvalidChargeParameters {
        charge_amount: i64,
        unlock_amount: i64,
    },

    #[error("Invalid order id: must not be blank")]
    #[diagnostic(code(billing::invalid_order_id))]
    InvalidOrderId,

    #[error("No Organization for {0}")]
    #[diagnostic(
        code(billing::no_organization),
        help("an organization is created by the first deposit of its owner")
    )]
    NoOrganization(Identity),

    #[error("Insufficient balance: {owner} holds {available} {symbol}, {requested} requested")]
    #[diagnostic(code(billing::insufficient_balance))]
    InsufficientBalance {
        owner: Identity,
        symbol: String,
        available: i64,
        requested: i64,
    },

    #[error(
        "Insufficient locked balance: {owner} has {available} {symbol} locked, {requested} requested"
    )]
    #[diagnostic(code(billing::insufficient_locked_balance))]
    InsufficientLockedBalance {
        owner: Identity,
        symbol: String,
        available: i64,
        requested: i64,
    },

    #[error("Arithmetic overflow while {0}")]
    #[diagnostic(code(billing::overflow))]
    Overflow(&'static str),

    #[error("External transfer failed: {0}")]
    #[diagnostic(code(billing::external_transfer_failed))]
    ExternalTransferFailed(String),

    #[error("Invalid identity: {0}")]
    #[diagnostic(code(billing::invalid_identity))]
    InvalidIdentity(String),

    #[error("Malformed command: {0}")]
    #[diagnostic(code(billing::malformed_command))]
    MalformedCommand(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_violated_condition() {
        let err = LedgerError::InsufficientBalance {
            owner: Identity::user("alice"),
            symbol: "ELF".to_string(),
            available: 110,
            requested: 111,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: alice holds 110 ELF, 111 requested"
        );

        let err = LedgerError::Unauthorized {
            caller: Identity::user("mallory"),
            operation: "charge",
            required: Role::Treasurer,
        };
        assert!(err.to_string().starts_with("No Permission"));
        assert!(err.to_string().contains("treasurer"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let code = LedgerError::InvalidOrderId.code().unwrap().to_string();
        assert_eq!(code, "billing::invalid_order_id");
    }
}
