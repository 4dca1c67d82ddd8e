use clap::Parser;
use miette::{IntoDiagnostic, Result};
use polisa::application::reconciliation::{ContractReconciler, ReconciliationConfig};
use polisa::application::worker::ReconciliationWorker;
use polisa::domain::ports::{
    ClientStoreRef, ContractStoreRef, NotificationSenderRef, VerificationStoreRef,
};
use polisa::infrastructure::in_memory::{
    InMemoryClientStore, InMemoryContractStore, InMemoryVerificationStore,
    LoggingNotificationSender,
};
#[cfg(feature = "storage-rocksdb")]
use polisa::infrastructure::rocksdb::RocksDbStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Scheduled checker for problematic insurance contracts.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database. If omitted, runs against empty in-memory
    /// stores (useful for smoke-testing the scheduler).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Run a single reconciliation pass and exit.
    #[arg(long)]
    once: bool,

    /// Delay before the first scheduled run.
    #[arg(long, default_value_t = 30)]
    start_delay_secs: u64,

    /// Interval between scheduled runs.
    #[arg(long, default_value_t = 3600)]
    interval_secs: u64,

    /// Days a contract may stay unpaid before it is flagged.
    #[arg(long, default_value_t = 7)]
    unpaid_threshold_days: i64,

    /// Days before expiration at which renewal reminders go out.
    #[arg(long, default_value_t = 30)]
    renewal_window_days: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (contracts, verifications, clients) = open_stores(&cli)?;
    let notifications: NotificationSenderRef = Arc::new(LoggingNotificationSender::new());

    let config = ReconciliationConfig {
        unpaid_threshold_days: cli.unpaid_threshold_days,
        renewal_window_days: cli.renewal_window_days,
    };
    let reconciler =
        ContractReconciler::new(contracts, verifications, clients, notifications, config);

    if cli.once {
        let report = reconciler.run().await.into_diagnostic()?;
        info!(total = report.total(), "single reconciliation run finished");
        return Ok(());
    }

    let worker = ReconciliationWorker::new(
        reconciler,
        Duration::from_secs(cli.start_delay_secs),
        Duration::from_secs(cli.interval_secs),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    worker.run(shutdown_rx).await;
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(cli: &Cli) -> Result<(ContractStoreRef, VerificationStoreRef, ClientStoreRef)> {
    if let Some(db_path) = &cli.db_path {
        let store = RocksDbStore::open(db_path).into_diagnostic()?;
        return Ok((
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        ));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(cli: &Cli) -> Result<(ContractStoreRef, VerificationStoreRef, ClientStoreRef)> {
    if cli.db_path.is_some() {
        return Err(miette::miette!(
            "--db-path requires the storage-rocksdb feature"
        ));
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (ContractStoreRef, VerificationStoreRef, ClientStoreRef) {
    (
        Arc::new(InMemoryContractStore::new()),
        Arc::new(InMemoryVerificationStore::new()),
        Arc::new(InMemoryClientStore::new()),
    )
}
