use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::MatchingConfig;
use crate::constants::source_priority;
use crate::types::CompanyRecord;

/// Multi-word legal forms removed from names before comparison. Longer
/// phrases come first so they win over their abbreviations.
const LEGAL_FORM_PHRASES: &[&str] = &[
    "общество с ограниченной ответственностью",
    "закрытое акционерное общество",
    "открытое акционерное общество",
    "публичное акционерное общество",
    "акционерное общество",
    "индивидуальный предприниматель",
];

/// Single-token legal forms, removed whole-word anywhere in the name.
const LEGAL_FORM_TOKENS: &[&str] = &["ооо", "зао", "оао", "ао", "ип", "пао"];

/// Entity resolver: groups records believed to describe the same company
/// (exact tax-id match first, fuzzy name match for the remainder) and merges
/// each group into one canonical record.
pub struct Resolver {
    config: MatchingConfig,
}

impl Resolver {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Reduce the batch to one record per believed-distinct entity.
    ///
    /// Exact (tax-id) groups and fuzzy (name) groups are resolved
    /// independently and never reconciled against each other: a company
    /// appearing once with a tax id and once without stays two records.
    pub fn resolve(&self, records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
        let input_count = records.len();
        let (keyed, unkeyed): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|record| !record.tax_id.is_empty());

        let exact_groups = group_by_tax_id(keyed);
        let fuzzy_groups = self.group_by_similarity(unkeyed);

        let mut resolved = Vec::with_capacity(exact_groups.len() + fuzzy_groups.len());
        for (_, group) in exact_groups {
            resolved.push(merge_group(group));
        }
        for group in fuzzy_groups {
            resolved.push(merge_group(group));
        }

        debug!(
            input = input_count,
            output = resolved.len(),
            "Entity resolution complete"
        );
        resolved
    }

    /// Single-pass greedy clustering over records without a tax id.
    ///
    /// The first unassigned record anchors a new group; every later
    /// unassigned record similar to the *anchor* joins it. Similarity is
    /// deliberately not transitive: a record similar only to a non-anchor
    /// member stays out. Order-dependent by design.
    fn group_by_similarity(&self, records: Vec<CompanyRecord>) -> Vec<Vec<CompanyRecord>> {
        let keys: Vec<String> = records
            .iter()
            .map(|record| comparison_key(&record.name))
            .collect();

        let mut slots: Vec<Option<CompanyRecord>> = records.into_iter().map(Some).collect();
        let mut assigned = vec![false; slots.len()];
        let mut groups = Vec::new();

        for i in 0..slots.len() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;
            let mut group = vec![slots[i].take().expect("record already consumed")];

            for j in (i + 1)..slots.len() {
                if assigned[j] {
                    continue;
                }
                if self.names_similar(&keys[i], &keys[j]) {
                    assigned[j] = true;
                    group.push(slots[j].take().expect("record already consumed"));
                }
            }

            groups.push(group);
        }

        groups
    }

    /// Whether two comparison keys plausibly name the same company.
    fn names_similar(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }

        if a == b {
            return true;
        }

        if sequence_ratio(a, b) >= self.config.ratio_threshold {
            return true;
        }

        let min_len = self.config.containment_min_len;
        if a.chars().count() > min_len
            && b.chars().count() > min_len
            && (a.contains(b) || b.contains(a))
        {
            return true;
        }

        token_jaccard(a, b) >= self.config.jaccard_threshold
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

/// Partition records by exact tax-id equality, preserving first-seen group
/// order. A shared tax id is authoritative; no fuzzy matching applies.
fn group_by_tax_id(records: Vec<CompanyRecord>) -> Vec<(String, Vec<CompanyRecord>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<CompanyRecord>)> = Vec::new();

    for record in records {
        match index.get(&record.tax_id) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(record.tax_id.clone(), groups.len());
                let tax_id = record.tax_id.clone();
                groups.push((tax_id, vec![record]));
            }
        }
    }

    groups
}

/// Normalize a name for similarity comparison: lowercase, legal forms
/// removed whole-word, punctuation collapsed to spaces.
pub(crate) fn comparison_key(name: &str) -> String {
    let mut lower = name.to_lowercase();
    for phrase in LEGAL_FORM_PHRASES {
        lower = lower.replace(phrase, " ");
    }

    let spaced: String = lower
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    spaced
        .split_whitespace()
        .filter(|token| !LEGAL_FORM_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Longest matching block between two char slices, preferring the earliest
/// block (classic SequenceMatcher rule). Returns (start_a, start_b, length).
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, &ca) in a.iter().enumerate() {
        let mut row: HashMap<usize, usize> = HashMap::new();
        for (j, &cb) in b.iter().enumerate() {
            if ca != cb {
                continue;
            }
            let len = if j == 0 {
                1
            } else {
                j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
            };
            row.insert(j, len);
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        j2len = row;
    }

    best
}

/// Total length of all matching blocks (Ratcliff/Obershelp recursion).
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Character-level similarity in [0, 1]: twice the matched length over the
/// combined length.
pub(crate) fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a_chars, &b_chars) as f64 / total as f64
}

/// Jaccard similarity over whitespace-split token sets.
pub(crate) fn token_jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// Merge a duplicate group into one canonical record. Singletons pass
/// through unchanged.
fn merge_group(mut group: Vec<CompanyRecord>) -> CompanyRecord {
    if group.len() == 1 {
        return group.remove(0);
    }

    let base_index = select_base_index(&group);

    // Distinct provenance tokens in first-encounter group order
    let mut sources: Vec<String> = Vec::new();
    for record in &group {
        let source = record.source.trim();
        if !source.is_empty() && !sources.iter().any(|seen| seen == source) {
            sources.push(source.to_string());
        }
    }

    let mut merged = group[base_index].clone();
    for (i, record) in group.iter().enumerate() {
        if i == base_index {
            continue;
        }
        fold_into(&mut merged, record);
    }

    if !sources.is_empty() {
        merged.source = sources.join(", ");
    }

    debug!(company = %merged.name, members = group.len(), "Merged duplicate group");
    merged
}

/// Pick the group member with the most trustworthy data: filled fields plus
/// source priority, with bonuses for known revenue and a tax id. Ties keep
/// the first-seen record.
fn select_base_index(group: &[CompanyRecord]) -> usize {
    let mut best_index = 0;
    let mut best_score = record_score(&group[0]);

    for (i, record) in group.iter().enumerate().skip(1) {
        let score = record_score(record);
        if score > best_score {
            best_index = i;
            best_score = score;
        }
    }

    best_index
}

fn record_score(record: &CompanyRecord) -> u32 {
    let mut score = record.filled_field_count() + source_priority(&record.source);
    if record.revenue > 0.0 {
        score += 10;
    }
    if !record.tax_id.is_empty() {
        score += 5;
    }
    score
}

/// Field-level merge policy, applied per field rather than as one cascade:
/// text fields fill in when the base is empty, numeric fields keep the
/// larger value (any positive value replaces an unknown 0), descriptions
/// are replaced only by strictly longer text, everything else keeps the
/// base value.
fn fold_into(base: &mut CompanyRecord, incoming: &CompanyRecord) {
    fill_text(&mut base.name, &incoming.name);
    fill_text(&mut base.tax_id, &incoming.tax_id);
    merge_revenue(&mut base.revenue, incoming.revenue);
    merge_count(&mut base.employee_count, incoming.employee_count);
    merge_description(&mut base.description, &incoming.description);
    fill_text(&mut base.industry_code, &incoming.industry_code);
    fill_text(&mut base.website, &incoming.website);
    fill_text(&mut base.region, &incoming.region);
    fill_text(&mut base.contact, &incoming.contact);
    fill_text(&mut base.rating_ref, &incoming.rating_ref);
    // revenue_year, segment_tag and source always carry a value; base wins.
    // The group-level source join happens in merge_group.
}

fn fill_text(base: &mut String, incoming: &str) {
    if base.trim().is_empty() && !incoming.trim().is_empty() {
        *base = incoming.to_string();
    }
}

fn merge_revenue(base: &mut f64, incoming: f64) {
    if *base == 0.0 {
        *base = incoming;
    } else if incoming > *base {
        *base = incoming;
    }
}

fn merge_count(base: &mut u32, incoming: u32) {
    if *base == 0 {
        *base = incoming;
    } else if incoming > *base {
        *base = incoming;
    }
}

fn merge_description(base: &mut String, incoming: &str) {
    if incoming.chars().count() > base.chars().count() {
        *base = incoming.to_string();
    }
}
