use std::collections::HashMap;

use serde::Serialize;

use crate::types::CompanyRecord;

/// Aggregate statistics over a finished roster, for operator-facing output.
#[derive(Debug, Serialize)]
pub struct RosterSummary {
    pub total: usize,
    pub by_segment: Vec<(String, usize)>,
    pub by_source: Vec<(String, usize)>,
    pub revenue: Option<RevenueSummary>,
    pub top_regions: Vec<(String, usize)>,
    pub completeness: Vec<FieldCompleteness>,
}

/// Revenue distribution over the records that carry data.
#[derive(Debug, Serialize)]
pub struct RevenueSummary {
    pub with_data: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Serialize)]
pub struct FieldCompleteness {
    pub field: &'static str,
    pub filled: usize,
    pub percent: f64,
}

pub fn summarize(companies: &[CompanyRecord]) -> RosterSummary {
    let by_segment = counted(companies.iter().map(|c| c.segment_tag.to_string()));

    // Merged records carry a comma-joined source list; count each provider
    let by_source = counted(
        companies
            .iter()
            .flat_map(|c| c.source.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    );

    let mut revenues: Vec<f64> = companies
        .iter()
        .map(|c| c.revenue)
        .filter(|r| *r > 0.0)
        .collect();
    revenues.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let revenue = if revenues.is_empty() {
        None
    } else {
        let with_data = revenues.len();
        let sum: f64 = revenues.iter().sum();
        Some(RevenueSummary {
            with_data,
            min: revenues[0],
            max: revenues[with_data - 1],
            mean: sum / with_data as f64,
            median: median_of_sorted(&revenues),
        })
    };

    let mut top_regions = counted(
        companies
            .iter()
            .map(|c| c.region.clone())
            .filter(|r| !r.is_empty()),
    );
    top_regions.truncate(5);

    let total = companies.len();
    let completeness = vec![
        field_completeness("tax_id", total, companies.iter().filter(|c| !c.tax_id.is_empty()).count()),
        field_completeness("revenue", total, companies.iter().filter(|c| c.revenue > 0.0).count()),
        field_completeness("website", total, companies.iter().filter(|c| !c.website.is_empty()).count()),
        field_completeness("contact", total, companies.iter().filter(|c| !c.contact.is_empty()).count()),
        field_completeness("industry_code", total, companies.iter().filter(|c| !c.industry_code.is_empty()).count()),
    ];

    RosterSummary {
        total,
        by_segment,
        by_source,
        revenue,
        top_regions,
        completeness,
    }
}

/// Print the summary in the operator report format.
pub fn print_summary(summary: &RosterSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("ROSTER SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Companies: {}", summary.total);

    if !summary.by_segment.is_empty() {
        println!("\nBy segment:");
        for (segment, count) in &summary.by_segment {
            println!("  {}: {}", segment, count);
        }
    }

    if !summary.by_source.is_empty() {
        println!("\nBy source:");
        for (source, count) in &summary.by_source {
            println!("  {}: {}", source, count);
        }
    }

    if let Some(revenue) = &summary.revenue {
        println!("\nRevenue ({} companies with data):", revenue.with_data);
        println!("  Min: {:.0}", revenue.min);
        println!("  Max: {:.0}", revenue.max);
        println!("  Mean: {:.0}", revenue.mean);
        println!("  Median: {:.0}", revenue.median);
    }

    if !summary.top_regions.is_empty() {
        println!("\nTop regions:");
        for (region, count) in &summary.top_regions {
            println!("  {}: {}", region, count);
        }
    }

    println!("\nField completeness:");
    for field in &summary.completeness {
        println!("  {}: {}/{} ({:.1}%)", field.field, field.filled, summary.total, field.percent);
    }

    println!("{}", "=".repeat(60));
}

/// Count occurrences, largest first; ties break alphabetically for stable
/// output.
fn counted(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn field_completeness(field: &'static str, total: usize, filled: usize) -> FieldCompleteness {
    let percent = if total > 0 {
        filled as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    FieldCompleteness {
        field,
        filled,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SegmentTag;

    fn company(name: &str, segment: SegmentTag, source: &str, revenue: f64, region: &str) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            tax_id: String::new(),
            revenue,
            revenue_year: 2024,
            segment_tag: segment,
            source: source.to_string(),
            industry_code: String::new(),
            employee_count: 0,
            website: String::new(),
            description: String::new(),
            region: region.to_string(),
            contact: String::new(),
            rating_ref: String::new(),
        }
    }

    #[test]
    fn test_summarize_counts_and_revenue() {
        let roster = vec![
            company("LBL", SegmentTag::Btl, "marketing_tech, rrar_2025", 900.0, "Москва"),
            company("Оазис", SegmentTag::Souvenir, "rrar_2025", 400.0, "Санкт-Петербург"),
            company("Ивент Студия", SegmentTag::Event, "marketing_tech", 0.0, "Москва"),
        ];

        let summary = summarize(&roster);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_segment.len(), 3);
        // Joined sources are counted per provider
        assert!(summary.by_source.contains(&("rrar_2025".to_string(), 2)));
        assert!(summary.by_source.contains(&("marketing_tech".to_string(), 2)));

        let revenue = summary.revenue.unwrap();
        assert_eq!(revenue.with_data, 2);
        assert_eq!(revenue.min, 400.0);
        assert_eq!(revenue.max, 900.0);
        assert_eq!(revenue.median, 650.0);

        assert_eq!(summary.top_regions[0], ("Москва".to_string(), 2));
    }

    #[test]
    fn test_summarize_empty_roster() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.revenue.is_none());
        assert!(summary.by_segment.is_empty());
    }
}
