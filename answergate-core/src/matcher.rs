//! Span matching: locate the sentences in retrieved chunks that support a claim.
//!
//! Matching is lexical. A chunk qualifies when enough of the claim's key
//! terms appear in it and, if the claim states any numbers, at least one of
//! those numbers appears verbatim. Within a qualifying chunk the single most
//! similar sentence becomes the span.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::GroundingConfig;
use crate::extractor::split_sentences;
use crate::patterns::{NamedPattern, compile_patterns};
use crate::types::{CitedSpan, ProvenanceChunk};

const NUMERIC_LITERALS: &[(&str, &str)] = &[
    ("dollar", r"\$\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\$\d+(?:\.\d{2})?"),
    ("percentage", r"\d+(?:\.\d+)?%"),
    ("number", r"\b(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\b"),
];

/// `|a ∩ b| / |a|`, or 0 when `a` is empty.
pub fn overlap_ratio(claim_terms: &HashSet<String>, chunk_terms: &HashSet<String>) -> f64 {
    if claim_terms.is_empty() {
        return 0.0;
    }
    let shared = claim_terms.intersection(chunk_terms).count();
    shared as f64 / claim_terms.len() as f64
}

/// `|a ∩ b| / |a ∪ b|`, or 0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let joined = |c: char| c.is_alphanumeric() || c == ':';
    !text[..start].chars().next_back().is_some_and(joined)
        && !text[end..].chars().next().is_some_and(joined)
}

/// Finds supporting spans for claims.
pub struct SpanMatcher {
    stop_words: HashSet<String>,
    min_term_len: usize,
    min_term_overlap: f64,
    min_span_similarity: f64,
    numeric_patterns: Vec<NamedPattern>,
}

impl SpanMatcher {
    pub fn new(config: &GroundingConfig) -> Self {
        Self {
            stop_words: config
                .stop_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            min_term_len: config.min_term_len,
            min_term_overlap: config.min_term_overlap,
            min_span_similarity: config.min_span_similarity,
            numeric_patterns: compile_patterns(NUMERIC_LITERALS),
        }
    }

    /// Lower-cased content words of `text`.
    ///
    /// Short tokens, stop words and purely numeric tokens are dropped. Used
    /// for claims and chunks alike so overlap is symmetric.
    pub fn key_terms(&self, text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= self.min_term_len)
            .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }

    /// Dollar amounts, percentages and bare numbers in `text`, deduplicated
    /// in first-seen order. Digits inside multipliers (`4x`) and ratios
    /// (`1:1`) are not numbers.
    pub fn numeric_literals(&self, text: &str) -> Vec<String> {
        let mut literals: Vec<String> = Vec::new();
        for pattern in &self.numeric_patterns {
            for m in pattern.regex.find_iter(text) {
                if pattern.name == "number" && !is_standalone(text, m.start(), m.end()) {
                    continue;
                }
                let literal = m.as_str();
                if !literals.iter().any(|l| l == literal) {
                    literals.push(literal.to_string());
                }
            }
        }
        literals
    }

    /// Chunk-level filter: enough term overlap, and numeric agreement when
    /// the claim carries numbers.
    pub fn accepts_chunk(
        &self,
        claim_terms: &HashSet<String>,
        literals: &[String],
        chunk: &ProvenanceChunk,
    ) -> bool {
        let ratio = overlap_ratio(claim_terms, &self.key_terms(&chunk.content));
        if ratio < self.min_term_overlap {
            tracing::trace!(chunk_id = %chunk.id, ratio, "Chunk rejected on term overlap");
            return false;
        }
        let numbers_agree =
            literals.is_empty() || literals.iter().any(|l| chunk.content.contains(l.as_str()));
        if !numbers_agree {
            tracing::trace!(chunk_id = %chunk.id, "Chunk rejected on numeric literals");
        }
        numbers_agree
    }

    /// Best-matching sentence in an accepted chunk, if it clears the
    /// similarity floor.
    fn localize(&self, claim_terms: &HashSet<String>, chunk: &ProvenanceChunk) -> Option<CitedSpan> {
        let mut best: Option<(f64, usize, &str)> = None;
        for unit in split_sentences(&chunk.content) {
            let score = jaccard(claim_terms, &self.key_terms(unit.text));
            if best.is_none_or(|(top, _, _)| score > top) {
                best = Some((score, unit.offset, unit.text));
            }
        }

        let (similarity, offset, text) = best?;
        if similarity < self.min_span_similarity {
            return None;
        }

        let start = chunk.content[..offset].chars().count();
        let end = start + text.chars().count();
        let meta = &chunk.metadata;
        Some(CitedSpan {
            id: format!("{}:{}-{}", chunk.id, start, end),
            chunk_id: chunk.id.clone(),
            document_id: meta.id.clone(),
            start,
            end,
            text: text.to_string(),
            source: meta.source.clone(),
            trust_tier: meta.trust_tier,
            retrieved_at: meta.retrieved_at,
            url: meta.url.clone(),
            title: meta.title.clone(),
            similarity,
        })
    }

    /// Supporting spans for `claim`, most authoritative first, then most similar.
    pub fn find_spans(&self, claim: &str, chunks: &[ProvenanceChunk]) -> Vec<CitedSpan> {
        let claim_terms = self.key_terms(claim);
        let literals = self.numeric_literals(claim);

        let mut spans: Vec<CitedSpan> = chunks
            .iter()
            .filter(|chunk| self.accepts_chunk(&claim_terms, &literals, chunk))
            .filter_map(|chunk| self.localize(&claim_terms, chunk))
            .collect();

        spans.sort_by(|a, b| {
            a.trust_tier.cmp(&b.trust_tier).then_with(|| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
            })
        });
        spans
    }
}
