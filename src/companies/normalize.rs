//! Company name and website normalization

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LEGAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(ltd|limited|inc|incorporated|llc|plc|corp|corporation|co|company)\b").unwrap()
});
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());
static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

/// Matching key for `employer_companies.normalized_name`
///
/// "Marks & Spencer plc" and "marks and spencer" do not collide, but
/// "Acme Ltd", "ACME" and "Acme Limited" all become `acme`.
pub fn normalize_company_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NON_ALNUM_SPACE.replace_all(&lowered, "");
    let dashed = WHITESPACE_RUN.replace_all(&stripped, "-");
    let without_suffix = LEGAL_SUFFIX.replace_all(&dashed, "");
    let collapsed = DASH_RUN.replace_all(&without_suffix, "-");

    collapsed.trim_matches('-').trim().to_string()
}

/// Normalization used when an extracted company arrives without one:
/// lower-case with every non-alphanumeric character turned into `-`
pub fn loose_normalized_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}

/// Host part of a URL without `www.`; falls back to string surgery for bare domains
pub fn extract_domain(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            return host.strip_prefix("www.").unwrap_or(host).to_string();
        }
    }

    let without_scheme = SCHEME.replace(url, "");
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(&without_scheme);
    without_www.split('/').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_legal_suffixes() {
        assert_eq!(normalize_company_name("Acme Ltd"), "acme");
        assert_eq!(normalize_company_name("ACME Limited"), "acme");
        assert_eq!(normalize_company_name("Acme Inc."), "acme");
        assert_eq!(normalize_company_name("Marks & Spencer plc"), "marks-spencer");
    }

    #[test]
    fn test_normalize_keeps_suffix_inside_words() {
        assert_eq!(normalize_company_name("Coca-Cola Company"), "cocacola");
        assert_eq!(normalize_company_name("Costco"), "costco");
        assert_eq!(normalize_company_name("Incorporate Labs"), "incorporate-labs");
    }

    #[test]
    fn test_normalize_collapses_dashes() {
        assert_eq!(normalize_company_name("  The   Co   Group  "), "the-group");
        assert_eq!(normalize_company_name("Limited"), "");
    }

    #[test]
    fn test_loose_normalized_name() {
        assert_eq!(loose_normalized_name("Acme Ltd."), "acme-ltd-");
        assert_eq!(loose_normalized_name("BP"), "bp");
    }

    #[test]
    fn test_extract_domain_from_urls() {
        assert_eq!(extract_domain("https://www.acme.com/about"), "acme.com");
        assert_eq!(extract_domain("http://shop.acme.co.uk"), "shop.acme.co.uk");
    }

    #[test]
    fn test_extract_domain_from_bare_hosts() {
        assert_eq!(extract_domain("www.acme.com/careers"), "acme.com");
        assert_eq!(extract_domain("acme.com"), "acme.com");
    }
}
