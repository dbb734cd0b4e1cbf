use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{AdjustCommand, ConfigCommand, HistoryCommand, RunJobCommand, ShowCommand};
use stockroom::config::Config;
use stockroom::inventory::InventoryService;
use stockroom::scheduler::{JobKind, JobRunner};
use stockroom::store::{InventoryStore, SummaryLog};

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(version)]
#[command(about = "Manage the kitchen ingredient inventory", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current inventory
    Show(ShowCommand),

    /// Add to or take from an ingredient's remaining stock
    Adjust(AdjustCommand),

    /// Zero every reorder quantity now
    Reset(RunJobCommand),

    /// Record a daily summary now
    Summarize(RunJobCommand),

    /// List recorded daily summaries
    History(HistoryCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .or_else(|| std::env::var("STOCKROOM_CONFIG").ok().map(PathBuf::from));
    let config = Config::load(config_path)?;

    let service = InventoryService::new(
        InventoryStore::new(&config.data_path.value),
        config.timezone.value,
    );
    let log = SummaryLog::new(&config.summary_path.value);

    match cli.command {
        Some(Commands::Show(cmd)) => cmd.run(&service).await?,
        Some(Commands::Adjust(cmd)) => cmd.run(&service).await?,
        Some(Commands::Reset(cmd)) => {
            let runner = JobRunner::new(service, log);
            cmd.run(JobKind::Reset, &runner, &config).await?;
        }
        Some(Commands::Summarize(cmd)) => {
            let runner = JobRunner::new(service, log);
            cmd.run(JobKind::Summary, &runner, &config).await?;
        }
        Some(Commands::History(cmd)) => cmd.run(&log)?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
