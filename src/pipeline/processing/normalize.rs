use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FilterConfig;
use crate::constants::canonicalize_source;
use crate::text::{clean_text, extract_email, extract_phone, is_valid_url, title_case};
use crate::types::{CompanyRecord, RawRecord, SegmentTag};

/// Legal-form prefixes stripped from company names. The long phrase is
/// listed first so it wins over its abbreviations.
static LEGAL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^(?:общество с ограниченной ответственностью|ооо|зао|оао|пао|ао|ип)\b\s*["'«]?"#,
    )
    .unwrap()
});

static WRAPPING_QUOTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^["'«]|["'»]$"#).unwrap());

/// Characters with no place in a company name; replaced with spaces.
static NAME_JUNK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[^\w\s&.()"'-]"#).unwrap());

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").unwrap());

static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

static INDUSTRY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\.\d{1,2}(?:\.\d{1,2})?").unwrap());

/// Why the normalizer refused to produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No usable company name could be recovered from the raw record.
    Unsalvageable,
    /// Revenue is known and falls below the configured minimum.
    BelowMinRevenue,
}

/// Trait for normalizing raw collector records into canonical company records
pub trait Normalizer {
    /// Produce a canonical record, or explain why the raw record was dropped.
    /// A rejection never aborts the batch; the caller counts and moves on.
    fn normalize(&self, raw: &RawRecord) -> Result<CompanyRecord, RejectReason>;
}

/// Vocabulary and thresholds owned by the default normalizer. Passing these
/// in (rather than reading ambient globals) keeps tests free to override the
/// tables.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Revenue floor; records with 0 < revenue < min_revenue are rejected.
    /// Revenue 0 means "no data" and is never rejected.
    pub min_revenue: f64,
    /// Ordered synonym table mapping lowercase substrings to canonical
    /// region names. First match wins.
    pub region_synonyms: Vec<(String, String)>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_revenue: 200_000_000.0,
            region_synonyms: default_region_synonyms(),
        }
    }
}

impl NormalizerConfig {
    pub fn from_filters(filters: &FilterConfig) -> Self {
        Self {
            min_revenue: filters.min_revenue,
            ..Self::default()
        }
    }
}

fn default_region_synonyms() -> Vec<(String, String)> {
    [
        ("москва", "Москва"),
        ("moscow", "Москва"),
        ("спб", "Санкт-Петербург"),
        ("санкт-петербург", "Санкт-Петербург"),
        ("питер", "Санкт-Петербург"),
        ("petersburg", "Санкт-Петербург"),
        ("екатеринбург", "Екатеринбург"),
        ("новосибирск", "Новосибирск"),
        ("казань", "Казань"),
        ("нижний новгород", "Нижний Новгород"),
        ("ростов-на-дону", "Ростов-на-Дону"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Default normalizer applying the per-field cleaning rules
pub struct DefaultNormalizer {
    config: NormalizerConfig,
}

impl DefaultNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    fn clean_region(&self, raw: &str) -> String {
        let region = clean_text(raw);
        if region.is_empty() {
            return region;
        }

        let lower = region.to_lowercase();
        for (pattern, canonical) in &self.config.region_synonyms {
            if lower.contains(pattern) {
                return canonical.clone();
            }
        }

        title_case(&region)
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, raw: &RawRecord) -> Result<CompanyRecord, RejectReason> {
        let fields = match raw.as_object() {
            Some(map) => map,
            None => {
                warn!("Dropping raw record that is not an object");
                return Err(RejectReason::Unsalvageable);
            }
        };

        // Name is the only mandatory field
        let name = clean_company_name(text_value(fields, &["name"]));
        if name.is_empty() {
            warn!("Dropping record without a usable company name");
            return Err(RejectReason::Unsalvageable);
        }

        let record = CompanyRecord {
            name,
            tax_id: clean_tax_id(raw_value(fields, &["tax_id", "inn"])),
            revenue: clean_revenue(raw_value(fields, &["revenue"])),
            revenue_year: clean_revenue_year(raw_value(fields, &["revenue_year"])),
            segment_tag: SegmentTag::from_free_text(text_value(fields, &["segment_tag"])),
            source: canonicalize_source(text_value(fields, &["source"])),
            industry_code: clean_industry_code(raw_value(fields, &["industry_code", "okved_main"])),
            employee_count: clean_employee_count(raw_value(fields, &["employee_count", "employees"])),
            website: clean_url(text_value(fields, &["website", "site"])),
            description: clean_description(text_value(fields, &["description"])),
            region: self.clean_region(text_value(fields, &["region"])),
            contact: clean_contact(text_value(fields, &["contact", "contacts"])),
            rating_ref: clean_url(text_value(fields, &["rating_ref"])),
        };

        // Known-but-tiny revenue fails the validity gate; zero passes through
        // as "no data".
        if record.revenue > 0.0 && record.revenue < self.config.min_revenue {
            debug!(
                company = %record.name,
                revenue = record.revenue,
                "Filtered out by minimum revenue"
            );
            return Err(RejectReason::BelowMinRevenue);
        }

        Ok(record)
    }
}

/// First string value found under any of the given keys.
fn text_value<'a>(fields: &'a serde_json::Map<String, Value>, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find_map(|value| value.as_str())
        .unwrap_or("")
}

/// First value present under any of the given keys, regardless of type.
fn raw_value<'a>(fields: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| fields.get(*key))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn clean_company_name(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut name = clean_text(raw);
    name = LEGAL_PREFIX_RE.replace(&name, "").to_string();
    name = WRAPPING_QUOTES_RE.replace_all(&name, "").to_string();
    name = NAME_JUNK_RE.replace_all(&name, " ").to_string();

    clean_text(&name)
}

/// Keep digits only; a tax id is valid iff it has exactly 10 or 12 of them.
/// Anything else is treated as absent, not as an error.
fn clean_tax_id(value: Option<&Value>) -> String {
    let raw = match value {
        Some(v) => value_to_text(v),
        None => return String::new(),
    };

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 || digits.len() == 12 {
        digits
    } else {
        String::new()
    }
}

fn clean_revenue(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0).max(0.0),
        Some(Value::String(s)) => parse_revenue_text(s),
        _ => 0.0,
    }
}

/// Parse a revenue figure out of free text: first numeric token, scaled by a
/// magnitude word found anywhere in the cleaned text. Unparsable input maps
/// to 0 ("no data").
fn parse_revenue_text(raw: &str) -> f64 {
    let cleaned = clean_text(raw).to_lowercase();

    let token = match NUMBER_RE.find(&cleaned) {
        Some(found) => found.as_str().replace(',', "."),
        None => return 0.0,
    };
    let value: f64 = match token.parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };

    let multiplier = if cleaned.contains("млрд") || cleaned.contains("billion") {
        1e9
    } else if cleaned.contains("млн") || cleaned.contains("million") {
        1e6
    } else if cleaned.contains("тыс") || cleaned.contains("thousand") {
        1e3
    } else {
        1.0
    };

    (value * multiplier).max(0.0)
}

fn clean_revenue_year(value: Option<&Value>) -> i32 {
    let year = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match year {
        Some(y) if (2000..=2025).contains(&y) => y as i32,
        _ => 2024,
    }
}

fn clean_industry_code(value: Option<&Value>) -> String {
    let raw = match value {
        Some(v) => value_to_text(v),
        None => return String::new(),
    };

    INDUSTRY_CODE_RE
        .find(&raw)
        .map(|found| found.as_str().to_string())
        .unwrap_or_default()
}

fn clean_employee_count(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                v.min(u32::MAX as u64) as u32
            } else {
                // Negative or fractional counts carry no information
                n.as_f64().filter(|f| *f >= 1.0).map(|f| f as u32).unwrap_or(0)
            }
        }
        Some(Value::String(s)) => INT_RE
            .find(s)
            .and_then(|found| found.as_str().parse::<u64>().ok())
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        _ => 0,
    }
}

fn clean_url(raw: &str) -> String {
    let url = raw.trim();
    if is_valid_url(url) {
        url.to_string()
    } else {
        String::new()
    }
}

fn clean_description(raw: &str) -> String {
    let description = clean_text(raw);
    if description.chars().count() > 300 {
        let truncated: String = description.chars().take(300).collect();
        format!("{}...", truncated)
    } else {
        description
    }
}

/// Prefer a phone number, then an email, then the head of the raw text.
fn clean_contact(raw: &str) -> String {
    let contact = clean_text(raw);
    if contact.is_empty() {
        return contact;
    }

    if let Some(phone) = extract_phone(&contact) {
        return phone;
    }
    if let Some(email) = extract_email(&contact) {
        return email;
    }

    contact.chars().take(50).collect()
}
