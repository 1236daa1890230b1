//! Adapters for the domain ports: storage (in-memory, RocksDB), the asset
//! ledger and event sinks.

pub mod asset_ledger;
pub mod event_log;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
