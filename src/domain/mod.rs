//! Domain model: identities, assets, the per-(owner, symbol) balance state
//! machine, organizations, roles, events and the ports the engine drives.

pub mod account;
pub mod asset;
pub mod command;
pub mod event;
pub mod identity;
pub mod organization;
pub mod ports;
pub mod roles;
