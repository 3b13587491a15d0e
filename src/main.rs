use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use pitchdesk::config::PitchdeskConfig;
use pitchdesk::store::SessionStore;
use pitchdesk::submit::{LogNotificationSink, SubmissionFinalizer};
use pitchdesk::telemetry::init_telemetry;
use pitchdesk::transport::console::{self, ConsoleSender};
use pitchdesk::verify::{DriveRelocator, EvmBalanceSource};
use pitchdesk::wizard::{
    Dispatcher, NavigationController, StepRegistry, UserId, WalletPolicy,
};

#[derive(Parser)]
#[command(name = "pitchdesk")]
#[command(about = "Chat wizard that collects and verifies startup applications")]
#[command(long_about = "PitchDesk walks an applicant through a five-question wizard over a \
                       chat transport, relocates uploaded decks to document storage, verifies \
                       on-chain token holdings, and keeps one finalized submission per user.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wizard dispatch loop on the console transport
    Serve {
        /// User id to tag console events with
        #[arg(long, default_value = "1", help = "Identifier used for the console user")]
        user: i64,
        /// Chat handle attached to the submission
        #[arg(long, help = "Handle shown on the finalized submission")]
        handle: Option<String>,
    },
    /// List stored submission records
    Records,
}

fn main() -> Result<()> {
    let _ = PitchdeskConfig::load_env_file();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        user: 1,
        handle: None,
    }) {
        Commands::Serve { user, handle } => tokio::runtime::Runtime::new()?
            .block_on(async { serve_command(UserId(user), handle).await }),
        Commands::Records => {
            tokio::runtime::Runtime::new()?.block_on(async { records_command().await })
        }
    }
}

async fn serve_command(user: UserId, handle: Option<String>) -> Result<()> {
    let config = PitchdeskConfig::load()?;
    init_telemetry(&config.observability)?;

    let store = Arc::new(SessionStore::open(PathBuf::from(&config.store.path)).await?);

    let relocator = Arc::new(DriveRelocator::new(
        config.storage.upload_url.clone(),
        config.storage.token.clone(),
        config.storage.folder_id.clone(),
    ));
    let balance = Arc::new(EvmBalanceSource::new(
        config.wallet.rpc_url.clone(),
        config.wallet.token_address.clone(),
        config.wallet.decimals,
        config.wallet.rate_limit.requests_per_second,
        config.wallet.rate_limit.burst_capacity,
        Duration::from_secs(config.wallet.cache_ttl_seconds),
    ));
    let engine = NavigationController::new(
        StepRegistry::new(),
        relocator,
        balance,
        WalletPolicy {
            min_tokens: config.wallet.min_tokens,
            symbol: config.wallet.symbol.clone(),
        },
    );
    let finalizer = SubmissionFinalizer::new(Arc::new(LogNotificationSink), store.clone());
    let dispatcher = Arc::new(Dispatcher::new(
        engine,
        store,
        finalizer,
        Arc::new(ConsoleSender),
    ));

    console::run(dispatcher, user, handle).await
}

async fn records_command() -> Result<()> {
    let config = PitchdeskConfig::load()?;
    let store = SessionStore::open(PathBuf::from(&config.store.path)).await?;
    let records = store.records_snapshot().await;

    if records.is_empty() {
        println!("No submissions recorded yet.");
        return Ok(());
    }
    for record in records {
        let handle = record.handle.as_deref().unwrap_or("-");
        println!(
            "{}  user {}  @{}  {} answers",
            record.submit_time.format("%Y-%m-%d %H:%M:%S"),
            record.user_id,
            handle,
            record.answers.len()
        );
    }
    Ok(())
}
