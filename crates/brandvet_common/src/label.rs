//! Label normalization and agreement matching.
//!
//! Two tiers "agree" when they propose the same brand after normalization.
//! Normalization is deliberately conservative: lowercase, strip punctuation
//! and trailing corporate suffixes, collapse whitespace. Anything fancier
//! (transliteration, fuzzy distance) belongs in the embedding tier, not
//! here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing corporate suffixes that carry no brand identity.
static CORPORATE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+(inc|incorporated|ltd|limited|llc|corp|corporation|co|company|gmbh|ag|sa|srl|plc|holding|holdings|group)\.?$",
    )
    .expect("corporate suffix regex is valid")
});

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Alphabetic}\p{N}]+").expect("non-alnum regex is valid"));

static MULTI_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("multi-space regex is valid"));

/// Normalize a label for comparison.
///
/// "Nike, Inc." and "nike" normalize to the same string.
pub fn normalize(label: &str) -> String {
    let lowered = label.trim().to_lowercase();

    // Strip corporate suffixes repeatedly ("Nike Holdings Inc." -> "nike").
    let mut stripped = lowered;
    loop {
        let next = CORPORATE_SUFFIX.replace(&stripped, "").into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }

    let alnum = NON_ALNUM.replace_all(&stripped, " ").into_owned();
    MULTI_SPACE
        .replace_all(alnum.trim(), " ")
        .into_owned()
}

/// Whether two labels name the same brand after normalization.
pub fn labels_match(a: &str, b: &str) -> bool {
    let (na, nb) = (normalize(a), normalize(b));
    !na.is_empty() && na == nb
}

/// Whether `label` matches `canonical` or any of its aliases.
pub fn matches_any(label: &str, canonical: &str, aliases: &[String]) -> bool {
    labels_match(label, canonical) || aliases.iter().any(|alias| labels_match(label, alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_suffix() {
        assert_eq!(normalize("Nike, Inc."), "nike");
        assert_eq!(normalize("Adidas AG"), "adidas");
        assert_eq!(normalize("ACME Holdings Ltd."), "acme");
    }

    #[test]
    fn test_normalize_collapses_punctuation() {
        assert_eq!(normalize("Coca-Cola"), "coca cola");
        assert_eq!(normalize("  Procter &  Gamble "), "procter gamble");
    }

    #[test]
    fn test_labels_match() {
        assert!(labels_match("Nike", "nike, inc."));
        assert!(labels_match("Coca-Cola", "Coca Cola Company"));
        assert!(!labels_match("Nike", "Adidas"));
        assert!(!labels_match("", ""));
    }

    #[test]
    fn test_matches_any_aliases() {
        let aliases = vec!["Blue Ribbon Sports".to_string(), "Nike Inc".to_string()];
        assert!(matches_any("nike", "Nike, Inc.", &aliases));
        assert!(matches_any("blue ribbon sports", "Nike, Inc.", &aliases));
        assert!(!matches_any("Reebok", "Nike, Inc.", &aliases));
    }

    #[test]
    fn test_suffix_only_label_is_not_emptied_into_match() {
        // A label that is nothing but a suffix must not match everything.
        assert!(!labels_match("Inc", "Ltd"));
    }
}
