//! Stockroom Server
//!
//! Serves the inventory dashboard and its JSON API, and runs the daily reset
//! and summary jobs.
//!
//! # Configuration
//!
//! Environment variables (a `.env` file in the working directory is read first):
//! - `STOCKROOM_CONFIG`: Path to config file (default: ~/.config/stockroom/config.yaml)
//! - `STOCKROOM_PORT` or `PORT`: Port to listen on (default: 3000)
//! - `STOCKROOM_DATA_PATH`: Inventory document (default: ~/.local/share/stockroom/data.json)
//! - `STOCKROOM_SUMMARY_PATH`: Summary history (default: ~/.local/share/stockroom/summary-log.json)
//! - `STOCKROOM_STATIC_DIR`: Dashboard files (default: ./public)
//! - `STOCKROOM_TIMEZONE`: IANA timezone for the daily jobs (default: Asia/Bangkok)
//! - `LINE_CHANNEL_ACCESS_TOKEN`, `LINE_GROUP_ID`: LINE push credentials
//!
//! # Config File Format
//!
//! ```yaml
//! port: 3000
//! data_path: data.json
//! summary_path: summary-log.json
//! timezone: Asia/Bangkok
//! schedule:
//!   reset: "12:00"
//!   summary: "00:00"
//! digest_limit: 10
//! dashboard_url: https://stock.example.com
//! line:
//!   group_id: C0123456789
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockroom::config::Config;
use stockroom::events::EventSender;
use stockroom::inventory::InventoryService;
use stockroom::notify::{build_notifier, Dispatcher, Renderer};
use stockroom::scheduler::{JobKind, JobRunner, Scheduler};
use stockroom::server::{self, AppState};
use stockroom::store::{InventoryStore, SummaryLog};

const DISPATCH_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=info,stockroom_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("STOCKROOM_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    match &config.config_file {
        Some(path) => tracing::info!("Config file: {}", path.display()),
        None => tracing::info!("No config file found, using defaults"),
    }
    tracing::info!("Inventory document: {}", config.data_path.value.display());
    tracing::info!("Summary log: {}", config.summary_path.value.display());
    tracing::info!("Timezone: {}", config.timezone.value);

    // Notifications
    let notifier = build_notifier(&config.line);
    let (events, event_rx) = EventSender::channel();
    let renderer = Renderer::new(config.digest_limit, config.dashboard_url.clone());
    let dispatcher = Dispatcher::new(notifier.clone(), renderer).spawn(event_rx);

    // Inventory and daily jobs
    let service = InventoryService::new(
        InventoryStore::new(&config.data_path.value),
        config.timezone.value,
    )
    .with_events(events);
    let runner = JobRunner::new(service.clone(), SummaryLog::new(&config.summary_path.value));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let jobs = Scheduler::new(config.timezone.value, runner)
        .with_job(JobKind::Reset, config.schedule.reset)
        .with_job(JobKind::Summary, config.schedule.summary)
        .spawn(shutdown_rx);

    // Build router
    let static_dir = &config.static_dir.value;
    if !static_dir.is_dir() {
        tracing::warn!("Static directory {} not found", static_dir.display());
    }
    let state = AppState::new(service, notifier).with_jobs(&jobs);
    let app = server::router(state, Some(static_dir));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down scheduled jobs");
    let _ = shutdown_tx.send(true);
    for job in jobs {
        if let Err(e) = job.task.await {
            tracing::warn!(job = %job.kind, "Scheduler task ended abnormally: {}", e);
        }
    }

    // Every event sender is gone now; let queued notifications go out.
    if tokio::time::timeout(DISPATCH_DRAIN_TIMEOUT, dispatcher).await.is_err() {
        tracing::warn!("Pending notifications dropped at shutdown");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
