use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use surrealdb::Surreal;
use surrealdb::engine::local::RocksDb;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dosfs::{JsonStore, Persister, Shell, Store, SurrealStore};

mod repl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Keep nothing across restarts.
    Memory,
    /// Snapshot to a JSON file.
    Json,
    /// Snapshot into a RocksDB-backed SurrealDB.
    Surreal,
}

/// A DOS-style command prompt over an in-memory filesystem.
#[derive(Debug, Parser)]
#[command(name = "dosfs", version)]
struct Cli {
    /// Where the filesystem is saved between runs.
    #[arg(long, value_enum, env = "DOSFS_STORE", default_value_t = StoreKind::Json)]
    store: StoreKind,

    /// JSON file or database directory for the store.
    /// Defaults to ./dosfs.json or ./dosfs-db.
    #[arg(long, env = "DOSFS_STATE")]
    state: Option<PathBuf>,

    /// Name shown in the prompt.
    #[arg(long, env = "DOSFS_USER", default_value = dosfs::dispatch::DEFAULT_USER)]
    user: String,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Run a command and exit. May be repeated.
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> dosfs::Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli);
    std::panic::set_hook(Box::new(|panic| tracing::error!("{panic}")));

    let store = open_store(&cli).await?;
    let fs = store.load_or_seed().await;
    let (persister, writer) = Persister::spawn(store);
    let mut shell = Shell::new(fs)
        .with_user(cli.user.as_str())
        .with_persister(persister);

    if cli.commands.is_empty() {
        repl::run(&mut shell).await?;
    } else {
        for command in &cli.commands {
            repl::render(&shell.execute(command), false);
        }
    }

    drop(shell);
    if let Err(e) = writer.await {
        warn!(error = %e, "snapshot writer did not finish cleanly");
    }
    Ok(())
}

fn setup_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter)
        .init();
}

async fn open_store(cli: &Cli) -> dosfs::Result<Store> {
    let store = match cli.store {
        StoreKind::Memory => {
            info!("using in-memory store, nothing will be saved");
            Store::Memory
        }
        StoreKind::Json => {
            let path = cli
                .state
                .clone()
                .unwrap_or_else(|| PathBuf::from("./dosfs.json"));
            info!(path = %path.display(), "using JSON snapshot store");
            Store::Json(JsonStore::new(path))
        }
        StoreKind::Surreal => {
            let path = cli
                .state
                .clone()
                .unwrap_or_else(|| PathBuf::from("./dosfs-db"));
            info!(path = %path.display(), "using RocksDB-backed SurrealDB store");
            let db = Surreal::new::<RocksDb>(path.as_path()).await?;
            db.use_ns("dosfs").use_db("shell").await?;
            Store::Surreal(SurrealStore::new(db))
        }
    };
    Ok(store)
}
