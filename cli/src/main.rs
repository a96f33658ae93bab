use anyhow::Result;
use clap::{Parser, Subcommand};
use moment_tracker_common::{
    FeedConfig, FetchOrchestrator, FetchOutcome, HistorySnapshot, MomentFeedClient, PublishedState,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, Duration};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about = "Moment history fetcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the history feed once and print records and counts
    Fetch,

    /// Fetch on a fixed interval and print the counts of each cycle
    Watch {
        /// Seconds between fetches
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Set up logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let config = FeedConfig::from_env();
    info!("Using history feed at {}", config.url);

    let client = MomentFeedClient::new(&config)?;
    let (orchestrator, outcomes) = FetchOrchestrator::new(Arc::new(client));

    match cli.command {
        Some(Commands::Watch { interval }) => watch(orchestrator, outcomes, interval).await,
        Some(Commands::Fetch) | None => fetch_once(orchestrator, outcomes).await,
    }
}

async fn fetch_once(
    orchestrator: FetchOrchestrator,
    mut outcomes: UnboundedReceiver<FetchOutcome>,
) -> Result<()> {
    orchestrator.trigger();

    match outcomes.recv().await {
        Some(FetchOutcome::Published { snapshot, .. }) => {
            print_snapshot(&snapshot);
            Ok(())
        }
        Some(FetchOutcome::Failed { error, .. }) => {
            println!("Fetch failed: {}", error);
            std::process::exit(1);
        }
        None => {
            println!("Fetch task ended without reporting");
            std::process::exit(1);
        }
    }
}

async fn watch(
    orchestrator: FetchOrchestrator,
    mut outcomes: UnboundedReceiver<FetchOutcome>,
    interval_secs: u64,
) -> Result<()> {
    let mut state = PublishedState::new();
    let mut ticker = interval(Duration::from_secs(interval_secs));

    println!(
        "Watching the moment feed every {} seconds. Press Ctrl+C to exit.",
        interval_secs
    );

    loop {
        ticker.tick().await;

        orchestrator.trigger();
        if let Some(outcome) = outcomes.recv().await {
            state.apply(outcome);
        }

        // A failed cycle keeps printing the last good counts
        match state.snapshot() {
            Some(snapshot) => print_counts(snapshot),
            None => println!("No successful fetch yet"),
        }
    }
}

fn print_snapshot(snapshot: &HistorySnapshot) {
    if snapshot.records.is_empty() {
        println!("The history feed returned no records.");
    } else {
        println!(
            "{:<10} {:<28} {:<36} {}",
            "state", "entity_id", "last_changed", "last_updated"
        );
        for record in &snapshot.records {
            println!(
                "{:<10} {:<28} {:<36} {}",
                record.state, record.entity_id, record.last_changed, record.last_updated
            );
        }
        println!();
    }

    print_counts(snapshot);
}

fn print_counts(snapshot: &HistorySnapshot) {
    let summary = snapshot
        .counts
        .iter()
        .map(|(category, count)| format!("{}: {}", category.label(), count))
        .collect::<Vec<_>>()
        .join("  ");

    println!(
        "[{}] {}  ({} records, {} counted)",
        snapshot.fetched_at.format("%H:%M:%S"),
        summary,
        snapshot.records.len(),
        snapshot.counts.total()
    );
}
