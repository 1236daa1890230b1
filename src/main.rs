use billing_ledger::application::engine::BillingEngine;
use billing_ledger::config::GenesisConfig;
use billing_ledger::domain::identity::Invocation;
use billing_ledger::domain::ports::{EventSinkBox, LedgerStoreBox};
use billing_ledger::error::LedgerError;
use billing_ledger::infrastructure::event_log::{JsonLinesEventSink, TracingEventSink};
use billing_ledger::infrastructure::in_memory::InMemoryLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use billing_ledger::infrastructure::rocksdb::RocksDBStore;
use billing_ledger::interfaces::csv::balance_writer::BalanceWriter;
use billing_ledger::interfaces::csv::command_reader::CommandReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Genesis JSON: roles, custody identity, accepted symbols and opening holdings.
    #[arg(long)]
    genesis: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Append emitted events to this file as JSON lines instead of logging them.
    #[arg(long)]
    events: Option<PathBuf>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBStore::open(path)?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::new()))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

fn open_event_sink(events: Option<PathBuf>) -> Result<EventSinkBox> {
    match events {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .into_diagnostic()?;
            Ok(Box::new(JsonLinesEventSink::new(file)))
        }
        None => Ok(Box::new(TracingEventSink)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "billing_ledger=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .without_time(),
        )
        .init();

    let cli = Cli::parse();
    let genesis = GenesisConfig::load(&cli.genesis)?;

    let engine = BillingEngine::new(
        genesis.custody.clone(),
        open_store(cli.db_path)?,
        Box::new(genesis.asset_ledger().await?),
        open_event_sink(cli.events)?,
    );

    match engine
        .initialize(
            &Invocation::new(genesis.admin.clone()),
            genesis.initialize_input(),
        )
        .await
    {
        Ok(()) => {}
        Err(LedgerError::AlreadyInitialized) => {
            info!("Store already initialized, keeping its roles");
        }
        Err(e) => return Err(e.into()),
    }

    // Replay commands; a rejected one is reported and skipped.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (line, command) in reader.commands().enumerate() {
        match command {
            Ok((caller, command)) => {
                let name = command.name();
                if let Err(e) = engine.execute(&Invocation::new(caller), command).await {
                    warn!(row = line + 1, command = name, error = %e, "Error processing command");
                }
            }
            Err(e) => {
                warn!(row = line + 1, error = %e, "Error reading command");
            }
        }
    }

    let accounts = engine.accounts().await?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_accounts(&accounts)?;

    Ok(())
}
