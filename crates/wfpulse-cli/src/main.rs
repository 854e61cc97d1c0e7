mod probe;

use clap::{Parser, Subcommand};

use wfpulse_core::AppConfig;
use wfpulse_ingest::Collector;
use wfpulse_store::SnapshotStore;

#[derive(Debug, Parser)]
#[command(name = "wfpulse-cli")]
#[command(about = "wfpulse command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one full collection and replace the snapshot.
    Refresh,
    /// Print snapshot summary counts.
    Stats,
    /// Hit each configured source once and print a sample of its output.
    Probe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = wfpulse_core::load_app_config()?;

    match cli.command {
        Commands::Refresh => refresh(&config).await,
        Commands::Stats => stats(&config),
        Commands::Probe => probe::run(&config).await,
    }
}

async fn refresh(config: &AppConfig) -> anyhow::Result<()> {
    let collector = Collector::from_config(config)?;
    let store = SnapshotStore::new(config.data_file.clone());

    let records = collector.collect_all().await;
    if records.is_empty() {
        println!("collection produced no records; snapshot left unchanged");
        return Ok(());
    }

    store.save_all(&records)?;
    println!(
        "snapshot at {} refreshed with {} records",
        store.path().display(),
        records.len()
    );
    Ok(())
}

fn stats(config: &AppConfig) -> anyhow::Result<()> {
    let store = SnapshotStore::new(config.data_file.clone());
    println!("{}", serde_json::to_string_pretty(&store.stats())?);
    Ok(())
}
