/// Provenance token constants to ensure consistency across the codebase.
/// These constants define the mapping between raw source labels and the
/// canonical tokens that drive merge priority during deduplication.

// Canonical provenance tokens (stored on every CompanyRecord)
pub const RRAR_SOURCE: &str = "rrar_2025";
pub const MARKETING_TECH_SOURCE: &str = "marketing_tech";
pub const FNS_SOURCE: &str = "fns_open_data";
pub const RUSPROFILE_SOURCE: &str = "rusprofile";
pub const LIST_ORG_SOURCE: &str = "list_org";
pub const UNKNOWN_SOURCE: &str = "unknown";

// User-facing collector names (used in CLI)
pub const DEMO_SOURCE: &str = "demo";

/// Substring patterns mapping a raw source label to its canonical token.
/// Matched in order against the lowercased label; first hit wins.
const SOURCE_PATTERNS: &[(&str, &str)] = &[
    ("rrar", RRAR_SOURCE),
    ("alladvertising", RRAR_SOURCE),
    ("marketing-tech", MARKETING_TECH_SOURCE),
    ("marketing_tech", MARKETING_TECH_SOURCE),
    ("fns", FNS_SOURCE),
    ("rusprofile", RUSPROFILE_SOURCE),
    ("list-org", LIST_ORG_SOURCE),
    ("list_org", LIST_ORG_SOURCE),
];

/// Convert a raw source label to its canonical provenance token.
/// Labels from unrecognized providers pass through lowercased verbatim.
pub fn canonicalize_source(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return UNKNOWN_SOURCE.to_string();
    }

    let lower = trimmed.to_lowercase();
    for (pattern, canonical) in SOURCE_PATTERNS {
        if lower.contains(pattern) {
            return (*canonical).to_string();
        }
    }

    lower
}

/// Data-quality ranking over canonical tokens, used when picking the base
/// record of a duplicate group. Unranked sources score 0.
pub fn source_priority(source: &str) -> u32 {
    match source {
        FNS_SOURCE => 5,
        MARKETING_TECH_SOURCE => 4,
        RRAR_SOURCE => 3,
        RUSPROFILE_SOURCE => 2,
        LIST_ORG_SOURCE => 1,
        _ => 0,
    }
}

/// Get all supported user-facing collector names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![DEMO_SOURCE]
}
