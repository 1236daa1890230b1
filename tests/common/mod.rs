#![allow(dead_code)]

use billing_ledger::application::engine::{BillingEngine, InitializeInput};
use billing_ledger::domain::asset::Symbol;
use billing_ledger::domain::identity::{Identity, Invocation};
use billing_ledger::infrastructure::asset_ledger::InMemoryAssetLedger;
use billing_ledger::infrastructure::event_log::InMemoryEventLog;
use billing_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

pub const USER_FUNDS: i64 = 10_000;

pub struct Ledger {
    pub engine: BillingEngine,
    pub assets: InMemoryAssetLedger,
    pub events: InMemoryEventLog,
}

pub fn id(name: &str) -> Identity {
    Identity::user(name)
}

pub fn elf() -> Symbol {
    Symbol::new("ELF")
}

pub fn usdt() -> Symbol {
    Symbol::new("USDT")
}

pub fn as_(name: &str) -> Invocation {
    Invocation::new(id(name))
}

/// An initialized ledger accepting USDT and ELF, where `alice`, `bob` and
/// `carol` each hold `USER_FUNDS` of both at the asset ledger.
pub async fn ledger() -> Ledger {
    let assets = InMemoryAssetLedger::new(id("custody"));
    for user in ["alice", "bob", "carol"] {
        for symbol in [elf(), usdt()] {
            assets.mint(&id(user), &symbol, USER_FUNDS).await.unwrap();
        }
    }
    let events = InMemoryEventLog::new();
    let engine = BillingEngine::new(
        id("custody"),
        Box::new(InMemoryLedgerStore::new()),
        Box::new(assets.clone()),
        Box::new(events.clone()),
    );
    engine
        .initialize(
            &as_("admin"),
            InitializeInput {
                admin: id("admin"),
                treasurer: id("treasurer"),
                fee_address: id("fees"),
                symbols: [usdt(), elf()].into(),
            },
        )
        .await
        .unwrap();
    Ledger {
        engine,
        assets,
        events,
    }
}

impl Ledger {
    /// Deposits on behalf of `user` and returns their organization.
    pub async fn fund(&self, user: &str, symbol: Symbol, amount: i64) -> Identity {
        self.engine.deposit(&as_(user), symbol, amount).await.unwrap();
        self.organization_of(user).await
    }

    pub async fn organization_of(&self, user: &str) -> Identity {
        self.engine
            .get_user_organization(&id(user))
            .await
            .unwrap()
            .expect("user has an organization")
    }

    pub async fn counters(&self, owner: &Identity, symbol: &Symbol) -> (i64, i64) {
        let view = self.engine.get_balance(owner, symbol).await.unwrap();
        (view.balance, view.locked_balance)
    }

    pub async fn event_names(&self) -> Vec<&'static str> {
        self.events.events().await.iter().map(|e| e.name()).collect()
    }
}

pub const GENESIS: &str = r#"{
    "admin": "admin",
    "treasurer": "treasurer",
    "fee_address": "fees",
    "custody": "custody",
    "symbols": ["USDT", "ELF"],
    "holdings": [
        {"owner": "alice", "symbol": "ELF", "amount": 1000},
        {"owner": "bob", "symbol": "USDT", "amount": 500}
    ]
}"#;

pub const COMMANDS_HEADER: &str = "op, caller, target, symbol, amount, unlock, order_id";

pub fn write_genesis(path: &Path) -> Result<(), Error> {
    std::fs::write(path, GENESIS)
}

pub fn write_commands(path: &Path, rows: &[&str]) -> Result<(), Error> {
    let mut file = File::create(path)?;
    writeln!(file, "{COMMANDS_HEADER}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    Ok(())
}
