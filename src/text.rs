use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Russian phone number shapes, tried in order. The first pattern that
/// matches anywhere in the text wins.
static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\+7[\s\-()]?\d{3}[\s\-()]?\d{3}[\s\-]?\d{2}[\s\-]?\d{2}").unwrap(),
        Regex::new(r"8[\s\-()]?\d{3}[\s\-()]?\d{3}[\s\-]?\d{2}[\s\-]?\d{2}").unwrap(),
        Regex::new(r"\(\d{3}\)[\s\-]?\d{3}[\s\-]?\d{2}[\s\-]?\d{2}").unwrap(),
    ]
});

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Conservative URL grammar: http/https scheme, then a domain, localhost or
/// a dotted-quad IP, optional port, optional path. Partial or malformed URLs
/// are rejected outright rather than salvaged.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

/// Strip HTML tags, collapse whitespace runs, and trim.
pub fn clean_text(text: &str) -> String {
    let without_tags = HTML_TAG_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(&without_tags, " ").trim().to_string()
}

/// Extract the first phone number found in the text, if any.
pub fn extract_phone(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    for pattern in PHONE_RES.iter() {
        if let Some(found) = pattern.find(text) {
            return Some(found.as_str().trim().to_string());
        }
    }

    None
}

/// Extract the first email address found in the text, if any.
pub fn extract_email(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    EMAIL_RE.find(text).map(|found| found.as_str().to_string())
}

/// Whether the full string satisfies the strict URL grammar.
pub fn is_valid_url(url: &str) -> bool {
    URL_RE.is_match(url)
}

/// Title-case every word: first alphabetic character after a non-alphabetic
/// boundary is uppercased, the rest lowercased ("ростов-на-дону" →
/// "Ростов-На-Дону").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_tags_and_whitespace() {
        assert_eq!(clean_text("<b>BTL</b>  агентство\n полного   цикла "), "BTL агентство полного цикла");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("  \t\n "), "");
    }

    #[test]
    fn test_extract_phone_formats() {
        assert_eq!(
            extract_phone("звоните +7 (495) 123-45-67 днём"),
            Some("(495) 123-45-67".to_string())
        );
        assert_eq!(
            extract_phone("тел. 8-495-123-45-67"),
            Some("8-495-123-45-67".to_string())
        );
        assert_eq!(extract_phone("пишите на почту"), None);
    }

    #[test]
    fn test_extract_email() {
        assert_eq!(
            extract_email("наш адрес: info@agency.ru, отдел продаж"),
            Some("info@agency.ru".to_string())
        );
        assert_eq!(extract_email("без почты"), None);
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://lbl.ru"));
        assert!(is_valid_url("http://marketing-tech.ru/companies/lbl/"));
        assert!(is_valid_url("https://localhost:8080/path"));
        assert!(is_valid_url("http://192.168.0.1/status"));
        assert!(!is_valid_url("lbl.ru"));
        assert!(!is_valid_url("ftp://lbl.ru"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("https://lbl.ru and more text"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ростов-на-дону"), "Ростов-На-Дону");
        assert_eq!(title_case("moscow region"), "Moscow Region");
        assert_eq!(title_case("ЕКАТЕРИНБУРГ"), "Екатеринбург");
    }
}
