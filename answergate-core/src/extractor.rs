//! Claim extraction: split a draft answer into sentences and keep the ones
//! worth checking against sources.

use std::sync::Arc;

use crate::config::GroundingConfig;
use crate::patterns::{ClaimPatterns, NamedPattern, compile_patterns};

/// A sentence located inside a larger text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceUnit<'a> {
    /// Byte offset of the trimmed sentence within the source text.
    pub offset: usize,
    pub text: &'a str,
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace.
///
/// Each unit is trimmed; empty units are dropped. Offsets index into `text`
/// so callers can locate the sentence in the original string.
pub fn split_sentences(text: &str) -> Vec<SentenceUnit<'_>> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() {
                let end = idx + c.len_utf8();
                push_unit(&mut units, text, start, end);
                start = end;
            }
        }
    }
    push_unit(&mut units, text, start, text.len());
    units
}

fn push_unit<'a>(units: &mut Vec<SentenceUnit<'a>>, text: &'a str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim_start();
    let offset = start + (raw.len() - trimmed.len());
    let trimmed = trimmed.trim_end();
    if !trimmed.is_empty() {
        units.push(SentenceUnit {
            offset,
            text: trimmed,
        });
    }
}

/// Collapse all whitespace runs (including newlines) into single spaces.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts checkable claims from a draft answer.
pub struct ClaimExtractor {
    min_chars: usize,
    patterns: Arc<ClaimPatterns>,
    citation_markers: Vec<NamedPattern>,
}

impl ClaimExtractor {
    pub fn new(config: &GroundingConfig) -> Self {
        Self::with_patterns(config, Arc::new(ClaimPatterns::new()))
    }

    /// Build an extractor sharing an already compiled pattern table.
    pub fn with_patterns(config: &GroundingConfig, patterns: Arc<ClaimPatterns>) -> Self {
        Self {
            min_chars: config.min_claim_chars,
            patterns,
            citation_markers: compile_patterns(&[(
                "bracketed_citation",
                r"\s*\[\d+(?:\s*,\s*\d+)*\]",
            )]),
        }
    }

    /// Extract claims in answer order. Duplicates are kept.
    pub fn extract(&self, answer: &str) -> Vec<String> {
        let normalized = normalize_whitespace(answer);
        split_sentences(&normalized)
            .into_iter()
            .map(|unit| unit.text)
            .filter(|sentence| sentence.chars().count() >= self.min_chars)
            .filter(|sentence| self.patterns.is_checkable(sentence))
            .map(|sentence| self.strip_citations(sentence))
            .collect()
    }

    /// Remove pre-existing `[1]` / `[2, 3]` citation markers.
    fn strip_citations(&self, sentence: &str) -> String {
        let mut cleaned = sentence.to_string();
        for marker in &self.citation_markers {
            cleaned = marker.regex.replace_all(&cleaned, "").into_owned();
        }
        cleaned.trim().to_string()
    }
}
