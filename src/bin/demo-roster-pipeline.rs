/// Demo: walk the fixture batch through every pipeline stage, showing what
/// each stage keeps and drops.
/// Raw records → Normalize → Relevance Filter → Entity Resolution → Revenue Gate
use anyhow::Result;
use btl_roster::config::Config;
use btl_roster::logging;
use btl_roster::pipeline::processing::normalize::{
    DefaultNormalizer, Normalizer, NormalizerConfig, RejectReason,
};
use btl_roster::pipeline::processing::relevance::RelevanceFilter;
use btl_roster::pipeline::processing::resolve::Resolver;
use btl_roster::pipeline::processing::revenue_gate::RevenueGate;
use btl_roster::sources::demo::DemoRosterSource;
use btl_roster::summary;
use btl_roster::types::{CompanyRecord, CompanySource};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    dotenv::dotenv().ok();

    println!("\n🚀 FULL PIPELINE DEMO: From raw records to canonical roster");
    println!("{}", "=".repeat(60));
    println!("Raw → Normalize → Relevance Filter → Resolve → Revenue Gate");
    println!("{}", "=".repeat(60));

    let config = Config::load()?;

    // Stage 0: collect the fixture batch
    let source = DemoRosterSource::new();
    let raw_records = source.fetch_companies().await?;
    println!("\n📥 Collected {} raw records", raw_records.len());

    // Stage 1: normalization
    let normalizer = DefaultNormalizer::new(NormalizerConfig::from_filters(&config.filters));
    let mut candidates: Vec<CompanyRecord> = Vec::new();
    let mut unsalvageable = 0;
    let mut below_floor = 0;
    for raw in &raw_records {
        match normalizer.normalize(raw) {
            Ok(record) => candidates.push(record),
            Err(RejectReason::Unsalvageable) => unsalvageable += 1,
            Err(RejectReason::BelowMinRevenue) => below_floor += 1,
        }
    }
    println!(
        "\n🧹 Normalized {} records (dropped {} unsalvageable, {} below the revenue floor)",
        candidates.len(),
        unsalvageable,
        below_floor
    );
    for record in &candidates {
        println!(
            "   {} [{}] tax_id={} revenue={:.0} source={}",
            record.name,
            record.segment_tag,
            if record.tax_id.is_empty() { "-" } else { record.tax_id.as_str() },
            record.revenue,
            record.source
        );
    }

    // Stage 2: relevance filter
    let filter = RelevanceFilter::default();
    let eligible: Vec<CompanyRecord> = candidates
        .into_iter()
        .filter(|record| filter.is_relevant(record))
        .collect();
    println!("\n🔎 {} records pass the relevance filter", eligible.len());

    // Stage 3: entity resolution
    let eligible_count = eligible.len();
    let resolver = Resolver::new(config.matching.clone());
    let resolved = resolver.resolve(eligible);
    println!(
        "\n🔗 Resolved {} records into {} entities ({} duplicates merged)",
        eligible_count,
        resolved.len(),
        eligible_count - resolved.len()
    );
    for record in &resolved {
        if record.source.contains(',') {
            println!("   Merged entity: {} ← [{}]", record.name, record.source);
        }
    }

    // Stage 4: revenue gate
    let gate = RevenueGate::new(config.filters.min_revenue);
    let mut roster: Vec<CompanyRecord> = resolved
        .into_iter()
        .filter(|record| gate.passes(record))
        .collect();
    roster.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    println!("\n💰 {} companies clear the revenue gate", roster.len());

    summary::print_summary(&summary::summarize(&roster));

    println!("✅ Demo complete");
    Ok(())
}
