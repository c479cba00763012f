pub mod processing;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::pipeline::processing::normalize::{
    DefaultNormalizer, Normalizer, NormalizerConfig, RejectReason,
};
use crate::pipeline::processing::relevance::RelevanceFilter;
use crate::pipeline::processing::resolve::Resolver;
use crate::pipeline::processing::revenue_gate::RevenueGate;
use crate::types::{CompanyRecord, RawRecord};

/// Counts for one pipeline stage. No record is dropped anywhere in the
/// pipeline without showing up in one of these.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageStats {
    pub input_count: usize,
    pub output_count: usize,
    pub removed_count: usize,
    pub removed_rate_percent: f64,
}

impl StageStats {
    fn for_counts(input_count: usize, output_count: usize) -> Self {
        let removed_count = input_count.saturating_sub(output_count);
        let removed_rate_percent = if input_count > 0 {
            (removed_count as f64 / input_count as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            input_count,
            output_count,
            removed_count,
            removed_rate_percent,
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub normalization: StageStats,
    /// Normalization drops that could not yield a usable record.
    pub unsalvageable_count: usize,
    /// Normalization drops with known revenue under the floor.
    pub below_threshold_count: usize,
    pub relevance: StageStats,
    pub resolution: StageStats,
    pub revenue_gate: StageStats,
    pub overall: StageStats,
    pub companies: Vec<CompanyRecord>,
}

/// Batch pipeline over an in-memory list of raw records:
/// normalize → relevance filter → entity resolution → revenue gate.
///
/// Purely synchronous and CPU-bound; collectors hand it a finite,
/// already-fetched batch. It never aborts: a bad record is counted and
/// skipped, and the result list may be empty. Deciding whether an empty
/// roster is a failure is the caller's call.
pub struct Pipeline {
    normalizer: Box<dyn Normalizer + Send + Sync>,
    relevance: RelevanceFilter,
    resolver: Resolver,
    revenue_gate: RevenueGate,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Self {
        Self {
            normalizer: Box::new(DefaultNormalizer::new(NormalizerConfig::from_filters(
                &config.filters,
            ))),
            relevance: RelevanceFilter::default(),
            resolver: Resolver::new(config.matching.clone()),
            revenue_gate: RevenueGate::new(config.filters.min_revenue),
        }
    }

    /// Assemble a pipeline from custom stages (tests override vocabularies
    /// and thresholds here).
    pub fn with_stages(
        normalizer: Box<dyn Normalizer + Send + Sync>,
        relevance: RelevanceFilter,
        resolver: Resolver,
        revenue_gate: RevenueGate,
    ) -> Self {
        Self {
            normalizer,
            relevance,
            resolver,
            revenue_gate,
        }
    }

    #[instrument(skip_all, fields(records = raw_records.len()))]
    pub fn process(&self, raw_records: &[RawRecord]) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let input_count = raw_records.len();
        info!(input_count, "Starting roster pipeline run");

        // Stage 1: normalization with per-reason drop accounting
        let mut unsalvageable_count = 0;
        let mut below_threshold_count = 0;
        let mut candidates = Vec::with_capacity(input_count);
        for raw in raw_records {
            match self.normalizer.normalize(raw) {
                Ok(record) => candidates.push(record),
                Err(RejectReason::Unsalvageable) => unsalvageable_count += 1,
                Err(RejectReason::BelowMinRevenue) => below_threshold_count += 1,
            }
        }
        let normalization = StageStats::for_counts(input_count, candidates.len());
        counter!("roster_records_normalized_total").increment(candidates.len() as u64);
        counter!("roster_records_unsalvageable_total").increment(unsalvageable_count as u64);
        counter!("roster_records_below_threshold_total").increment(below_threshold_count as u64);

        // Stage 2: relevance filter
        let eligible: Vec<CompanyRecord> = candidates
            .into_iter()
            .filter(|record| self.relevance.is_relevant(record))
            .collect();
        let relevance = StageStats::for_counts(normalization.output_count, eligible.len());

        // Stage 3: entity resolution
        let resolved = self.resolver.resolve(eligible);
        let resolution = StageStats::for_counts(relevance.output_count, resolved.len());
        counter!("roster_duplicates_merged_total").increment(resolution.removed_count as u64);

        // Stage 4: revenue gate
        let mut companies: Vec<CompanyRecord> = resolved
            .into_iter()
            .filter(|record| self.revenue_gate.passes(record))
            .collect();
        let revenue_gate = StageStats::for_counts(resolution.output_count, companies.len());

        // The roster is reported largest-first
        companies.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let finished_at = Utc::now();
        let duration_secs = (finished_at - started_at).num_milliseconds() as f64 / 1000.0;
        histogram!("roster_pipeline_duration_seconds").record(duration_secs);

        let overall = StageStats::for_counts(input_count, companies.len());
        info!(
            output_count = overall.output_count,
            removed_count = overall.removed_count,
            removed_rate_percent = overall.removed_rate_percent,
            "Roster pipeline run complete"
        );

        PipelineReport {
            run_id,
            started_at,
            finished_at,
            normalization,
            unsalvageable_count,
            below_threshold_count,
            relevance,
            resolution,
            revenue_gate,
            overall,
            companies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_stats_rate_rounding() {
        let stats = StageStats::for_counts(3, 2);
        assert_eq!(stats.removed_count, 1);
        assert_eq!(stats.removed_rate_percent, 33.33);

        let stats = StageStats::for_counts(0, 0);
        assert_eq!(stats.removed_rate_percent, 0.0);
    }

    #[test]
    fn test_empty_batch_yields_empty_report() {
        let pipeline = Pipeline::from_config(&Config::default());
        let report = pipeline.process(&[]);
        assert!(report.companies.is_empty());
        assert_eq!(report.overall.input_count, 0);
        assert_eq!(report.overall.removed_rate_percent, 0.0);
    }

    #[test]
    fn test_bad_records_are_counted_not_fatal() {
        let pipeline = Pipeline::from_config(&Config::default());
        let raw = vec![
            json!({"name": "LBL", "inn": "7707083893", "revenue": 986_900_000}),
            json!({"name": "   "}),
            json!(42),
            json!({"name": "Мелкое агентство", "revenue": 1_000_000}),
        ];

        let report = pipeline.process(&raw);
        assert_eq!(report.unsalvageable_count, 2);
        assert_eq!(report.below_threshold_count, 1);
        assert_eq!(report.companies.len(), 1);
        assert_eq!(report.companies[0].name, "LBL");
    }

    #[test]
    fn test_roster_sorted_by_revenue_descending() {
        let pipeline = Pipeline::from_config(&Config::default());
        let raw = vec![
            json!({"name": "Малое", "revenue": 300_000_000}),
            json!({"name": "Крупное", "revenue": 900_000_000}),
        ];

        let report = pipeline.process(&raw);
        assert_eq!(report.companies[0].name, "Крупное");
        assert_eq!(report.companies[1].name, "Малое");
    }
}
