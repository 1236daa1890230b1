//! Application layer orchestrating the ledger.
//!
//! `BillingEngine` is the entry point for every operation. It checks roles,
//! resolves organizations through the `OrganizationRegistry`, runs the balance
//! transition and drives the storage, transfer and event ports in order.

pub mod engine;
pub mod registry;
