use crate::types::{CompanyRecord, SegmentTag};

/// Vocabulary driving the relevance heuristics. Owned configuration so tests
/// can swap the tables without touching globals.
#[derive(Debug, Clone)]
pub struct RelevanceConfig {
    /// Segments that qualify a company outright.
    pub relevant_segments: Vec<SegmentTag>,
    /// Industry classifier codes matched by substring.
    pub relevant_industry_codes: Vec<String>,
    /// Marketing/BTL keywords matched against description + name.
    pub keywords: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            relevant_segments: SegmentTag::ALL.to_vec(),
            relevant_industry_codes: ["73.11", "82.30", "47.78.3", "73.20", "82.99"]
                .iter()
                .map(|code| code.to_string())
                .collect(),
            keywords: [
                "btl",
                "промо",
                "промоушн",
                "ивент",
                "event",
                "мерчендайзинг",
                "merchandising",
                "brand activation",
                "активация",
                "дегустация",
                "семплинг",
                "промо-акции",
                "трейд маркетинг",
                "trade marketing",
                "pos материалы",
                "стимулирование продаж",
            ]
            .iter()
            .map(|keyword| keyword.to_string())
            .collect(),
        }
    }
}

/// Stateless relevance predicate: a short-circuit OR over three heuristics,
/// cheapest first.
pub struct RelevanceFilter {
    config: RelevanceConfig,
}

impl RelevanceFilter {
    pub fn new(config: RelevanceConfig) -> Self {
        Self { config }
    }

    pub fn is_relevant(&self, record: &CompanyRecord) -> bool {
        // 1. Segment membership
        if self.config.relevant_segments.contains(&record.segment_tag) {
            return true;
        }

        // 2. Industry code
        if !record.industry_code.is_empty()
            && self
                .config
                .relevant_industry_codes
                .iter()
                .any(|code| record.industry_code.contains(code.as_str()))
        {
            return true;
        }

        // 3. Keyword match over description + name
        let haystack = format!("{} {}", record.description, record.name).to_lowercase();
        self.config
            .keywords
            .iter()
            .any(|keyword| haystack.contains(keyword.as_str()))
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(RelevanceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(segment: SegmentTag, industry_code: &str, name: &str, description: &str) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            tax_id: String::new(),
            revenue: 0.0,
            revenue_year: 2024,
            segment_tag: segment,
            source: "unknown".to_string(),
            industry_code: industry_code.to_string(),
            employee_count: 0,
            website: String::new(),
            description: description.to_string(),
            region: String::new(),
            contact: String::new(),
            rating_ref: String::new(),
        }
    }

    // The default segment set contains every variant, so heuristics 2 and 3
    // are exercised with an emptied segment table.
    fn filter_without_segment_rule() -> RelevanceFilter {
        RelevanceFilter::new(RelevanceConfig {
            relevant_segments: Vec::new(),
            ..RelevanceConfig::default()
        })
    }

    #[test]
    fn test_segment_membership_qualifies() {
        let filter = RelevanceFilter::default();
        assert!(filter.is_relevant(&record(SegmentTag::Promo, "", "Стройтрест", "")));
    }

    #[test]
    fn test_industry_code_qualifies() {
        let filter = filter_without_segment_rule();
        assert!(filter.is_relevant(&record(SegmentTag::Btl, "73.11", "Стройтрест", "")));
        assert!(!filter.is_relevant(&record(SegmentTag::Btl, "41.20", "Стройтрест", "")));
    }

    #[test]
    fn test_keyword_match_over_description_and_name() {
        let filter = filter_without_segment_rule();
        assert!(filter.is_relevant(&record(
            SegmentTag::Btl,
            "",
            "Стройтрест",
            "Дегустация и семплинг в торговых сетях"
        )));
        // Keyword in the name alone also counts
        assert!(filter.is_relevant(&record(SegmentTag::Btl, "", "Промо Центр", "")));
        assert!(!filter.is_relevant(&record(SegmentTag::Btl, "", "Стройтрест", "Жилое строительство")));
    }
}
