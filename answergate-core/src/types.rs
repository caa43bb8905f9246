//! Fundamental types for the grounding pipeline.
//!
//! Inputs arrive from the retrieval and generation collaborators as camelCase
//! JSON, so every wire-facing struct here uses `rename_all = "camelCase"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance metadata attached to a retrieved chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Identifier of the document the chunk was cut from.
    pub id: String,
    /// Source identifier (issuer site, forum, blog, ...).
    pub source: String,
    /// Authority tier, lower is more authoritative.
    pub trust_tier: u8,
    /// When the chunk was retrieved.
    pub retrieved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A retrieved passage supplied by the retrieval collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceChunk {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Retrieval score, when the retriever reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// A single supporting sentence located inside a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitedSpan {
    /// Stable identifier derived from the chunk id and offsets.
    pub id: String,
    pub chunk_id: String,
    pub document_id: String,
    /// Character offset (not byte offset) of the span start within the chunk.
    pub start: usize,
    /// Character offset one past the span end.
    pub end: usize,
    pub text: String,
    pub source: String,
    pub trust_tier: u8,
    pub retrieved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Jaccard similarity between the claim and this sentence.
    pub similarity: f64,
}

/// Kind of assertion a claim makes. Drives the confidence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Temporal,
    Procedural,
    Opinion,
    Comparative,
    Factual,
    Unknown,
}

impl ClaimType {
    /// Claims whose confidence is capped at `Medium` regardless of source authority.
    pub fn is_capped(&self) -> bool {
        matches!(self, ClaimType::Opinion | ClaimType::Temporal)
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClaimType::Temporal => "temporal",
            ClaimType::Procedural => "procedural",
            ClaimType::Opinion => "opinion",
            ClaimType::Comparative => "comparative",
            ClaimType::Factual => "factual",
            ClaimType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Confidence that a claim is supported by its spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    None,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Numeric weight used when averaging confidence across claims.
    pub fn weight(&self) -> f64 {
        match self {
            ConfidenceLevel::High => 1.0,
            ConfidenceLevel::Medium => 0.66,
            ConfidenceLevel::Low => 0.33,
            ConfidenceLevel::None => 0.0,
        }
    }
}

/// Verification outcome for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimGrounding {
    pub claim: String,
    /// Supporting spans, best match first.
    pub supporting_spans: Vec<CitedSpan>,
    pub is_grounded: bool,
    pub confidence: ConfidenceLevel,
    pub best_similarity: f64,
    pub claim_type: ClaimType,
}

impl ClaimGrounding {
    /// Build a grounding record. `is_grounded` and `best_similarity` are derived
    /// from the spans so they cannot disagree with them.
    pub fn new(
        claim: impl Into<String>,
        claim_type: ClaimType,
        supporting_spans: Vec<CitedSpan>,
        confidence: ConfidenceLevel,
    ) -> Self {
        let best_similarity = supporting_spans
            .iter()
            .map(|s| s.similarity)
            .fold(0.0_f64, f64::max);
        Self {
            claim: claim.into(),
            is_grounded: !supporting_spans.is_empty(),
            supporting_spans,
            confidence,
            best_similarity,
            claim_type,
        }
    }

    /// Lowest (most authoritative) trust tier among the supporting spans.
    pub fn best_trust_tier(&self) -> Option<u8> {
        self.supporting_spans.iter().map(|s| s.trust_tier).min()
    }
}

/// Whole-response statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingStats {
    pub total_claims: usize,
    pub grounded_claims: usize,
    pub ungrounded_claims: usize,
    pub high_confidence_claims: usize,
    pub low_trust_source_claims: usize,
    /// Weighted mean of per-claim confidence, rounded to two decimals.
    pub average_confidence: f64,
}

/// How the response as a whole fared.
///
/// Separates "nothing was checkable" from "everything checked out", which
/// `overall_grounded` alone cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingVerdict {
    NoCheckableClaims,
    FullyGrounded,
    PartiallyGrounded,
    Ungrounded,
}

/// Whole-response verification outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingVerificationResult {
    pub claims: Vec<ClaimGrounding>,
    /// True iff every claim is grounded. Vacuously true with no claims.
    pub overall_grounded: bool,
    pub ungrounded_claims: Vec<String>,
    pub stats: GroundingStats,
}

impl GroundingVerificationResult {
    pub fn verdict(&self) -> GroundingVerdict {
        let stats = &self.stats;
        if stats.total_claims == 0 {
            GroundingVerdict::NoCheckableClaims
        } else if stats.ungrounded_claims == 0 {
            GroundingVerdict::FullyGrounded
        } else if stats.grounded_claims == 0 {
            GroundingVerdict::Ungrounded
        } else {
            GroundingVerdict::PartiallyGrounded
        }
    }

    /// Collapse into the coarse summary the answerability gate consumes.
    pub fn summary(&self) -> GroundingResult {
        let grounded_percentage = if self.stats.total_claims == 0 {
            1.0
        } else {
            self.stats.grounded_claims as f64 / self.stats.total_claims as f64
        };
        GroundingResult {
            is_grounded: self.overall_grounded,
            grounded_percentage,
            ungrounded_claims: self.ungrounded_claims.clone(),
        }
    }

    /// The summary to hand the gate, or `None` when there was nothing to
    /// ground. An answer with no checkable claims is not fully grounded, so
    /// the gate's grounding check is skipped rather than passed.
    pub fn gate_summary(&self) -> Option<GroundingResult> {
        match self.verdict() {
            GroundingVerdict::NoCheckableClaims => None,
            _ => Some(self.summary()),
        }
    }
}

/// Coarse grounding summary consumed by the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingResult {
    pub is_grounded: bool,
    /// Fraction of claims grounded, in `[0, 1]`.
    pub grounded_percentage: f64,
    #[serde(default)]
    pub ungrounded_claims: Vec<String>,
}
