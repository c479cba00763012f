use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Raw company data as delivered by external collectors: a JSON object
/// mapping field names to untyped values. Fields may be missing and types
/// may be inconsistent (revenue as "500 млн" or as a number).
pub type RawRecord = serde_json::Value;

/// Market segment vocabulary for collected companies.
///
/// Declaration order doubles as the match priority when classifying free
/// text: the first variant whose token is contained in the input wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SegmentTag {
    #[default]
    #[serde(rename = "BTL")]
    Btl,
    #[serde(rename = "SOUVENIR")]
    Souvenir,
    #[serde(rename = "FULL_CYCLE")]
    FullCycle,
    #[serde(rename = "COMM_GROUP")]
    CommGroup,
    #[serde(rename = "EVENT")]
    Event,
    #[serde(rename = "PROMO")]
    Promo,
}

impl SegmentTag {
    /// All variants in declaration (priority) order.
    pub const ALL: [SegmentTag; 6] = [
        SegmentTag::Btl,
        SegmentTag::Souvenir,
        SegmentTag::FullCycle,
        SegmentTag::CommGroup,
        SegmentTag::Event,
        SegmentTag::Promo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentTag::Btl => "BTL",
            SegmentTag::Souvenir => "SOUVENIR",
            SegmentTag::FullCycle => "FULL_CYCLE",
            SegmentTag::CommGroup => "COMM_GROUP",
            SegmentTag::Event => "EVENT",
            SegmentTag::Promo => "PROMO",
        }
    }

    /// Classify free text by uppercase containment, first declared variant
    /// wins. Unmatched text falls back to BTL.
    pub fn from_free_text(text: &str) -> SegmentTag {
        let upper = text.to_uppercase();
        for tag in SegmentTag::ALL {
            if upper.contains(tag.as_str()) {
                return tag;
            }
        }
        SegmentTag::Btl
    }
}

impl std::fmt::Display for SegmentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical company record produced by the normalizer and consumed by every
/// later pipeline stage. Immutable once produced, except for in-place field
/// replacement while a duplicate group is merged.
///
/// A revenue of 0 means "unknown", not "zero income".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyRecord {
    pub name: String,
    /// Empty, or exactly 10 or 12 digits.
    pub tax_id: String,
    pub revenue: f64,
    pub revenue_year: i32,
    pub segment_tag: SegmentTag,
    /// Canonical provenance token; comma-joined list after a merge.
    pub source: String,
    pub industry_code: String,
    pub employee_count: u32,
    pub website: String,
    pub description: String,
    pub region: String,
    pub contact: String,
    pub rating_ref: String,
}

impl CompanyRecord {
    /// Count of populated fields, used when ranking duplicate-group members.
    pub fn filled_field_count(&self) -> u32 {
        let mut count = 0;
        for text in [
            &self.name,
            &self.tax_id,
            &self.source,
            &self.industry_code,
            &self.website,
            &self.description,
            &self.region,
            &self.contact,
            &self.rating_ref,
        ] {
            if !text.trim().is_empty() {
                count += 1;
            }
        }
        if self.revenue > 0.0 {
            count += 1;
        }
        if self.employee_count > 0 {
            count += 1;
        }
        if self.revenue_year != 0 {
            count += 1;
        }
        // segment_tag always carries a value
        count + 1
    }
}

/// Core trait that all company data collectors must implement
#[async_trait::async_trait]
pub trait CompanySource: Send + Sync {
    /// Unique identifier for this collector
    fn source_name(&self) -> &'static str;

    /// Fetch all company records from this data source
    async fn fetch_companies(&self) -> Result<Vec<RawRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_from_free_text() {
        assert_eq!(SegmentTag::from_free_text("btl агентство"), SegmentTag::Btl);
        assert_eq!(SegmentTag::from_free_text("souvenir"), SegmentTag::Souvenir);
        assert_eq!(SegmentTag::from_free_text("FULL_CYCLE"), SegmentTag::FullCycle);
        assert_eq!(SegmentTag::from_free_text("event-агентство"), SegmentTag::Event);
        assert_eq!(SegmentTag::from_free_text(""), SegmentTag::Btl);
        assert_eq!(SegmentTag::from_free_text("digital"), SegmentTag::Btl);
    }

    #[test]
    fn test_segment_priority_order_on_multiple_matches() {
        // Both BTL and EVENT appear; BTL is declared first and wins.
        assert_eq!(SegmentTag::from_free_text("BTL & EVENT"), SegmentTag::Btl);
    }

    #[test]
    fn test_filled_field_count() {
        let record = CompanyRecord {
            name: "LBL".to_string(),
            tax_id: String::new(),
            revenue: 0.0,
            revenue_year: 2024,
            segment_tag: SegmentTag::Btl,
            source: "marketing_tech".to_string(),
            industry_code: String::new(),
            employee_count: 0,
            website: String::new(),
            description: String::new(),
            region: String::new(),
            contact: String::new(),
            rating_ref: String::new(),
        };
        // name + source + revenue_year + segment_tag
        assert_eq!(record.filled_field_count(), 4);
    }
}
