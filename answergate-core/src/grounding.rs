//! The grounding service: extraction, classification, matching, confidence
//! and aggregation composed into a single pass over a draft answer.

use std::sync::Arc;

use crate::aggregator::GroundingAggregator;
use crate::classifier::ClaimClassifier;
use crate::confidence::ConfidenceAssessor;
use crate::config::GroundingConfig;
use crate::extractor::ClaimExtractor;
use crate::matcher::SpanMatcher;
use crate::patterns::ClaimPatterns;
use crate::types::{ClaimGrounding, GroundingVerificationResult, ProvenanceChunk};

/// Stateless grounding verifier.
///
/// Construct once from configuration and share freely: every method takes
/// `&self` and nothing is mutated after construction.
pub struct GroundingService {
    extractor: ClaimExtractor,
    classifier: ClaimClassifier,
    matcher: SpanMatcher,
    assessor: ConfidenceAssessor,
    aggregator: GroundingAggregator,
}

impl GroundingService {
    pub fn new(config: &GroundingConfig) -> Self {
        let patterns = Arc::new(ClaimPatterns::new());
        Self {
            extractor: ClaimExtractor::with_patterns(config, Arc::clone(&patterns)),
            classifier: ClaimClassifier::with_patterns(patterns),
            matcher: SpanMatcher::new(config),
            assessor: ConfidenceAssessor::new(config),
            aggregator: GroundingAggregator::new(config),
        }
    }

    pub fn matcher(&self) -> &SpanMatcher {
        &self.matcher
    }

    /// Ground a single, already extracted claim.
    pub fn ground_claim(&self, claim: &str, chunks: &[ProvenanceChunk]) -> ClaimGrounding {
        let claim_type = self.classifier.classify(claim);
        let spans = self.matcher.find_spans(claim, chunks);
        let confidence = self.assessor.assess(claim_type, &spans);
        ClaimGrounding::new(claim, claim_type, spans, confidence)
    }

    /// Verify every checkable claim in `answer` against `chunks`.
    pub fn verify(&self, answer: &str, chunks: &[ProvenanceChunk]) -> GroundingVerificationResult {
        let claims: Vec<ClaimGrounding> = self
            .extractor
            .extract(answer)
            .iter()
            .map(|claim| self.ground_claim(claim, chunks))
            .collect();

        let result = self.aggregator.aggregate(claims);
        tracing::debug!(
            total = result.stats.total_claims,
            grounded = result.stats.grounded_claims,
            high_confidence = result.stats.high_confidence_claims,
            chunks = chunks.len(),
            verdict = ?result.verdict(),
            "Grounding pass complete"
        );
        result
    }
}

impl Default for GroundingService {
    fn default() -> Self {
        Self::new(&GroundingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::chunk;
    use crate::types::{ClaimType, ConfidenceLevel, GroundingVerdict};

    #[test]
    fn test_service_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GroundingService>();
    }

    #[test]
    fn test_verify_annual_fee() {
        let service = GroundingService::default();
        let chunks = vec![chunk(
            "c1",
            "Card basics. The card carries an annual fee of $395 billed yearly.",
            0,
        )];
        let result = service.verify("The annual fee is $395.", &chunks);
        assert_eq!(result.claims.len(), 1);
        let claim = &result.claims[0];
        assert_eq!(claim.claim_type, ClaimType::Factual);
        assert!(claim.is_grounded);
        assert_eq!(claim.confidence, ConfidenceLevel::High);
        assert!(result.overall_grounded);
        assert_eq!(result.verdict(), GroundingVerdict::FullyGrounded);
    }

    #[test]
    fn test_verify_partial() {
        let service = GroundingService::default();
        let chunks = vec![chunk("c1", "The annual fee is $395.", 2)];
        let result = service.verify(
            "The annual fee is $395. Lounge guests are included for free.",
            &chunks,
        );
        assert_eq!(result.stats.total_claims, 2);
        assert_eq!(result.stats.grounded_claims, 1);
        assert_eq!(result.claims[0].confidence, ConfidenceLevel::Low);
        assert_eq!(
            result.ungrounded_claims,
            vec!["Lounge guests are included for free.".to_string()]
        );
        assert_eq!(result.verdict(), GroundingVerdict::PartiallyGrounded);
    }

    #[test]
    fn test_modal_may_claim_reaches_high_confidence() {
        let service = GroundingService::default();
        let sentence = "A foreign transaction fee of 3% may apply to purchases.";
        let chunks = vec![chunk("c1", sentence, 0)];
        let result = service.verify(sentence, &chunks);
        let claim = &result.claims[0];
        assert_eq!(claim.claim_type, ClaimType::Factual);
        assert_eq!(claim.confidence, ConfidenceLevel::High);
    }

    #[test]
    fn test_verify_empty_answer() {
        let result = GroundingService::default().verify("", &[]);
        assert!(result.claims.is_empty());
        assert!(result.overall_grounded);
        assert_eq!(result.verdict(), GroundingVerdict::NoCheckableClaims);
    }
}
