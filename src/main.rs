use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};

use btl_roster::config::Config;
use btl_roster::constants;
use btl_roster::logging;
use btl_roster::pipeline::{Pipeline, PipelineReport};
use btl_roster::sources::create_source;
use btl_roster::storage::{InMemoryStorage, RawBatch, RosterSnapshot, Storage};
use btl_roster::summary;
use btl_roster::types::RawRecord;

#[derive(Parser)]
#[command(name = "btl_roster")]
#[command(about = "BTL and marketing agency roster pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect raw company records from the configured sources
    Collect {
        /// Specific sources to run (comma-separated). Available: demo
        #[arg(long)]
        sources: Option<String>,
    },
    /// Clean, filter and deduplicate previously collected records
    Process,
    /// Collect and process in one go
    Run {
        /// Specific sources to run (comma-separated)
        #[arg(long)]
        sources: Option<String>,
    },
}

fn parse_source_names(sources: Option<String>) -> Vec<String> {
    if let Some(source_list) = sources {
        source_list.split(',').map(|s| s.trim().to_string()).collect()
    } else {
        vec![constants::DEMO_SOURCE.to_string()] // Default
    }
}

async fn collect_sources(source_names: &[String], storage: Arc<dyn Storage>) -> usize {
    let mut collected = 0;
    for source_name in source_names {
        let span = tracing::info_span!("Collecting source", source = %source_name);
        let _enter = span.enter();

        if let Some(source) = create_source(source_name) {
            info!("Starting collection");
            match source.fetch_companies().await {
                Ok(records) => {
                    info!(count = records.len(), "Source returned records");
                    collected += records.len();

                    let mut batch = RawBatch {
                        id: None,
                        source_name: source_name.clone(),
                        records,
                        collected_at: chrono::Utc::now(),
                    };
                    if let Err(e) = storage.save_raw_batch(&mut batch).await {
                        error!("Failed to store raw batch: {}", e);
                    }
                }
                Err(e) => {
                    // One failing source never takes down the whole run
                    error!("Source failed: {}", e);
                }
            }
        } else {
            warn!("Unknown source specified");
            println!("⚠️  Unknown source: {}", source_name);
            println!(
                "Available sources: {}",
                constants::get_supported_sources().join(", ")
            );
        }
    }
    collected
}

async fn process_collected(
    config: &Config,
    storage: Arc<dyn Storage>,
) -> Result<Option<PipelineReport>, Box<dyn std::error::Error>> {
    let raw_records: Vec<RawRecord> = storage.all_raw_records().await?;
    if raw_records.is_empty() {
        warn!("No raw records to process");
        println!("⚠️  Nothing to process. Collect records first, or use `run`.");
        return Ok(None);
    }

    let pipeline = Pipeline::from_config(config);
    let report = pipeline.process(&raw_records);

    let mut snapshot = RosterSnapshot {
        id: None,
        run_id: report.run_id,
        companies: report.companies.clone(),
        saved_at: chrono::Utc::now(),
    };
    storage.save_roster(&mut snapshot).await?;

    print_report(&report);
    Ok(Some(report))
}

fn print_report(report: &PipelineReport) {
    println!("\n📊 Pipeline Results:");
    println!("   Input records: {}", report.overall.input_count);
    println!(
        "   Normalized: {} (unsalvageable: {}, below revenue floor: {})",
        report.normalization.output_count, report.unsalvageable_count, report.below_threshold_count
    );
    println!("   Relevant: {}", report.relevance.output_count);
    println!(
        "   After deduplication: {} ({} duplicates merged, {:.2}% of eligible)",
        report.resolution.output_count,
        report.resolution.removed_count,
        report.resolution.removed_rate_percent
    );
    println!("   Final roster: {}", report.overall.output_count);

    summary::print_summary(&summary::summarize(&report.companies));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load()?;
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());

    match cli.command {
        Commands::Collect { sources } => {
            println!("🔄 Collecting raw company records...");
            let source_names = parse_source_names(sources);
            let collected = collect_sources(&source_names, storage.clone()).await;
            println!(
                "📦 Collected {} raw records from {} source(s)",
                collected,
                source_names.len()
            );
        }
        Commands::Process => {
            println!("🧹 Processing collected records...");
            process_collected(&config, storage.clone()).await?;
        }
        Commands::Run { sources } => {
            println!("🚀 Collecting and processing company records...");
            let source_names = parse_source_names(sources);
            let collected = collect_sources(&source_names, storage.clone()).await;
            println!("📦 Collected {} raw records", collected);
            process_collected(&config, storage.clone()).await?;
        }
    }

    Ok(())
}
