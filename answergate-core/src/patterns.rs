//! Regex pattern families that decide which sentences are checkable claims
//! and what kind of claim each one is.
//!
//! Families are held as an ordered table of `(tag, matchers)` pairs. The
//! table order is the classification precedence: the first family that
//! matches a sentence names its type.

use regex::Regex;

use crate::types::ClaimType;

/// A compiled, named pattern.
pub(crate) struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

/// Compile pattern definitions, skipping (and logging) any that fail.
pub(crate) fn compile_patterns(defs: &[(&'static str, &'static str)]) -> Vec<NamedPattern> {
    defs.iter()
        .filter_map(|&(name, pattern)| match Regex::new(pattern) {
            Ok(regex) => Some(NamedPattern { name, regex }),
            Err(e) => {
                tracing::warn!(pattern = name, error = %e, "Failed to compile claim pattern");
                None
            }
        })
        .collect()
}

const TEMPORAL: &[(&str, &str)] = &[
    (
        "relative_time",
        r"(?i)\b(currently|as of|since|until|starting)\b",
    ),
    ("year", r"\b(19|20)\d{2}\b"),
    (
        "month",
        r"(?i:\b(january|february|march|april|june|july|august|september|october|november|december)\b)|\bMay\s+\d",
    ),
];

const PROCEDURAL: &[(&str, &str)] = &[
    (
        "instruction",
        r"(?i)\b(you can|you need to|you must|you should|you'll need to)\b",
    ),
    ("steps", r"(?i)\bsteps?\s*:"),
    (
        "ordinal",
        r"(?i)\b(first|second|third|then|next|finally|afterwards)\b",
    ),
    ("how_to", r"(?i)\bhow to\b"),
    ("guide", r"(?i)\b(guide|instructions?)\b"),
];

const OPINION: &[(&str, &str)] = &[
    (
        "subjective",
        r"(?i)\b(best|worst|great|excellent|amazing|awesome|terrible|ideal|perfect|fantastic|worth it)\b",
    ),
    (
        "belief",
        r"(?i)\b(i think|i believe|i feel|in my opinion|in my view|personally)\b",
    ),
    ("recommendation", r"(?i)\b(recommend|suggest|prefer)\w*\b"),
];

const COMPARATIVE: &[(&str, &str)] = &[(
    "comparison",
    r"(?i)\b(vs\.?|versus|compared|better|worse|than)\b",
)];

const FACTUAL: &[(&str, &str)] = &[
    (
        "assertion_verb",
        r"(?i)\b(is|are|was|were|costs?|earns?|gives?|provides?|includes?|offers?)\b",
    ),
    ("number", r"\d"),
    ("currency", r"\$\s?\d"),
    ("percentage", r"\d+(\.\d+)?\s?%"),
    ("per_unit", r"(?i)\bper\s+\w+"),
];

/// One family of patterns sharing a claim type.
pub struct PatternFamily {
    tag: ClaimType,
    matchers: Vec<NamedPattern>,
}

impl PatternFamily {
    fn build(tag: ClaimType, defs: &[(&'static str, &'static str)]) -> Self {
        Self {
            tag,
            matchers: compile_patterns(defs),
        }
    }

    pub fn tag(&self) -> ClaimType {
        self.tag
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matchers.iter().any(|p| p.regex.is_match(text))
    }

    /// Name of the first pattern in this family matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        self.matchers
            .iter()
            .find(|p| p.regex.is_match(text))
            .map(|p| p.name)
    }
}

/// The full precedence-ordered pattern table.
pub struct ClaimPatterns {
    families: Vec<PatternFamily>,
}

impl ClaimPatterns {
    pub fn new() -> Self {
        Self {
            families: vec![
                PatternFamily::build(ClaimType::Temporal, TEMPORAL),
                PatternFamily::build(ClaimType::Procedural, PROCEDURAL),
                PatternFamily::build(ClaimType::Opinion, OPINION),
                PatternFamily::build(ClaimType::Comparative, COMPARATIVE),
                PatternFamily::build(ClaimType::Factual, FACTUAL),
            ],
        }
    }

    /// Families in classification precedence order.
    pub fn families(&self) -> &[PatternFamily] {
        &self.families
    }

    pub fn family(&self, tag: ClaimType) -> Option<&PatternFamily> {
        self.families.iter().find(|f| f.tag == tag)
    }

    /// Whether a sentence is worth checking: it must look factual,
    /// procedural or temporal. Opinion and comparison alone do not qualify.
    pub fn is_checkable(&self, sentence: &str) -> bool {
        self.families
            .iter()
            .filter(|f| {
                matches!(
                    f.tag,
                    ClaimType::Factual | ClaimType::Procedural | ClaimType::Temporal
                )
            })
            .any(|f| f.is_match(sentence))
    }
}

impl Default for ClaimPatterns {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        let patterns = ClaimPatterns::new();
        let expected = [
            (ClaimType::Temporal, TEMPORAL.len()),
            (ClaimType::Procedural, PROCEDURAL.len()),
            (ClaimType::Opinion, OPINION.len()),
            (ClaimType::Comparative, COMPARATIVE.len()),
            (ClaimType::Factual, FACTUAL.len()),
        ];
        for (tag, count) in expected {
            assert_eq!(patterns.family(tag).unwrap().matchers.len(), count, "{tag}");
        }
    }

    #[test]
    fn test_family_order_is_precedence() {
        let patterns = ClaimPatterns::new();
        let order: Vec<ClaimType> = patterns.families().iter().map(|f| f.tag()).collect();
        assert_eq!(
            order,
            vec![
                ClaimType::Temporal,
                ClaimType::Procedural,
                ClaimType::Opinion,
                ClaimType::Comparative,
                ClaimType::Factual,
            ]
        );
    }

    #[test]
    fn test_temporal_matchers() {
        let family = ClaimPatterns::new();
        let temporal = family.family(ClaimType::Temporal).unwrap();
        assert_eq!(
            temporal.first_match("Currently the bonus applies"),
            Some("relative_time")
        );
        assert_eq!(temporal.first_match("Launched in 2019 nationwide"), Some("year"));
        assert_eq!(temporal.first_match("Ends in March for everyone"), Some("month"));
        assert_eq!(temporal.first_match("The offer ends May 31"), Some("month"));
        assert!(!temporal.is_match("The lounge has free snacks"));
    }

    #[test]
    fn test_modal_may_is_not_a_month() {
        let patterns = ClaimPatterns::new();
        let temporal = patterns.family(ClaimType::Temporal).unwrap();
        assert!(!temporal.is_match("Foreign transaction fees may apply to purchases."));
        assert!(!temporal.is_match("May apply to balance transfers."));
    }

    #[test]
    fn test_factual_matchers() {
        let patterns = ClaimPatterns::new();
        let factual = patterns.family(ClaimType::Factual).unwrap();
        assert!(factual.is_match("The card earns points on dining"));
        assert!(factual.is_match("Get 4x points at restaurants"));
        assert!(factual.is_match("Cash back of 2 % everywhere"));
        assert!(factual.is_match("Five points per dollar on flights"));
        assert!(!factual.is_match("Wow, what a lovely surprise!"));
    }

    #[test]
    fn test_checkable_excludes_pure_opinion() {
        let patterns = ClaimPatterns::new();
        assert!(!patterns.is_checkable("Honestly I love that lovely metal design"));
        assert!(patterns.is_checkable("You can transfer points to airline partners"));
        assert!(patterns.is_checkable("The annual fee is $395."));
    }

    #[test]
    fn test_compile_patterns_skips_invalid() {
        let compiled = compile_patterns(&[("ok", r"\d+"), ("broken", r"(unclosed")]);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].name, "ok");
    }
}
