use anyhow::Result;
use chrono::Utc;
use serde_json::json;

use btl_roster::config::Config;
use btl_roster::pipeline::Pipeline;
use btl_roster::sources::demo::DemoRosterSource;
use btl_roster::storage::{InMemoryStorage, RawBatch, RosterSnapshot, Storage};
use btl_roster::types::CompanySource;

/// The canonical end-to-end scenario: 10 raw records describing 5 distinct
/// entities (two exact tax-id duplicate pairs, three singletons one of which
/// has a fuzzy-name duplicate with an unparsable revenue string), plus one
/// record below the revenue floor and one without a usable name.
#[test]
fn test_end_to_end_ten_records_five_entities() {
    let raw = vec![
        // Exact pair 1: same tax id, different spellings and field coverage
        json!({"name": "LBL", "inn": "7707083893", "revenue": 0, "source": "marketing-tech.ru"}),
        json!({"name": "ООО \"ЛБЛ\"", "inn": "7707083893", "revenue": 500_000_000, "source": "www.alladvertising.ru/top/btl/"}),
        // Exact pair 2
        json!({"name": "Оазис", "inn": "7801234567", "revenue": 420_000_000, "source": "www.alladvertising.ru/top/gifts/"}),
        json!({"name": "Oasis", "inn": "7801234567", "revenue": 0, "source": "list-org.com"}),
        // Singletons
        json!({"name": "DDVB", "inn": "7701234567", "revenue": 227_300_000, "source": "marketing-tech.ru"}),
        json!({"name": "N:OW", "inn": "7707456789", "revenue": 390_000_000, "source": "www.alladvertising.ru/top/event/"}),
        json!({"name": "Гамма Промо", "revenue": 250_000_000, "source": "www.alladvertising.ru/top/btl/"}),
        // Fuzzy duplicate of the singleton above; revenue string is junk
        json!({"name": "ООО «Гамма Промо»", "revenue": "нет данных", "source": "marketing-tech.ru"}),
        // Known revenue under the floor, tax id present: dropped at the
        // validity gate because the revenue is nonzero and under minimum
        json!({"name": "Мелкий Промоутер", "inn": "7799999999", "revenue": 150_000_000, "source": "list-org.com"}),
        // No usable name survives cleaning
        json!({"name": "<br/> ", "source": "marketing-tech.ru"}),
    ];
    assert_eq!(raw.len(), 10);

    let pipeline = Pipeline::from_config(&Config::default());
    let report = pipeline.process(&raw);

    assert_eq!(report.overall.input_count, 10);
    assert_eq!(report.overall.output_count, 5);
    assert_eq!(report.overall.removed_count, 5);
    assert_eq!(report.overall.removed_rate_percent, 50.0);

    assert_eq!(report.unsalvageable_count, 1);
    assert_eq!(report.below_threshold_count, 1);
    assert_eq!(report.normalization.output_count, 8);
    assert_eq!(report.relevance.output_count, 8);
    assert_eq!(report.resolution.output_count, 5);
    assert_eq!(report.resolution.removed_count, 3);
    assert_eq!(report.revenue_gate.output_count, 5);

    // The exact pair merged into one record with the known revenue and both
    // provenance tokens
    let lbl = report
        .companies
        .iter()
        .find(|c| c.tax_id == "7707083893")
        .expect("merged LBL record");
    assert_eq!(lbl.revenue, 500_000_000.0);
    assert_eq!(lbl.source, "marketing_tech, rrar_2025");

    // The fuzzy pair merged and kept the known revenue over the junk string
    let gamma = report
        .companies
        .iter()
        .find(|c| c.name == "Гамма Промо")
        .expect("merged fuzzy record");
    assert_eq!(gamma.revenue, 250_000_000.0);
    assert!(gamma.source.contains("rrar_2025"));
    assert!(gamma.source.contains("marketing_tech"));
}

/// A record with unknown revenue is never dropped, while the same record
/// with any known revenue under the floor is.
#[test]
fn test_revenue_floor_asymmetry_end_to_end() {
    let pipeline = Pipeline::from_config(&Config::default());

    let report = pipeline.process(&[json!({"name": "Промо Центр", "revenue": 0})]);
    assert_eq!(report.companies.len(), 1);

    let report = pipeline.process(&[json!({"name": "Промо Центр", "revenue": 199_999_999})]);
    assert!(report.companies.is_empty());
    assert_eq!(report.below_threshold_count, 1);
}

/// Full collect-and-process flow over the fixture source, including the
/// storage seam.
#[tokio::test]
async fn test_demo_source_through_pipeline_and_storage() -> Result<()> {
    let storage = InMemoryStorage::new();
    let source = DemoRosterSource::new();

    let records = source.fetch_companies().await?;
    let mut batch = RawBatch {
        id: None,
        source_name: source.source_name().to_string(),
        records,
        collected_at: Utc::now(),
    };
    storage.save_raw_batch(&mut batch).await?;

    let raw_records = storage.all_raw_records().await?;
    let pipeline = Pipeline::from_config(&Config::default());
    let report = pipeline.process(&raw_records);

    assert_eq!(report.overall.input_count, 15);
    assert_eq!(report.unsalvageable_count, 1);
    assert_eq!(report.below_threshold_count, 1);
    assert_eq!(report.companies.len(), 11);

    // The keyed "Креон" and the fuzzy-merged listing entries are distinct
    // entities by design: exact and fuzzy groups are never reconciled
    let creon_count = report.companies.iter().filter(|c| c.name == "Креон").count();
    assert_eq!(creon_count, 2);

    let mut snapshot = RosterSnapshot {
        id: None,
        run_id: report.run_id,
        companies: report.companies.clone(),
        saved_at: Utc::now(),
    };
    storage.save_roster(&mut snapshot).await?;

    let latest = storage.latest_roster().await?.expect("saved roster");
    assert_eq!(latest.companies.len(), 11);
    assert_eq!(latest.run_id, report.run_id);

    Ok(())
}
