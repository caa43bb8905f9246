//! Whole-response reduction over per-claim grounding results.

use crate::config::GroundingConfig;
use crate::types::{
    ClaimGrounding, ConfidenceLevel, GroundingStats, GroundingVerificationResult,
};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduces per-claim results into [`GroundingVerificationResult`].
pub struct GroundingAggregator {
    low_trust_tier: u8,
}

impl GroundingAggregator {
    pub fn new(config: &GroundingConfig) -> Self {
        Self {
            low_trust_tier: config.low_trust_tier,
        }
    }

    /// A grounded claim counts as low-trust when even its most authoritative
    /// span sits at or above the low-trust tier.
    fn is_low_trust(&self, claim: &ClaimGrounding) -> bool {
        claim
            .best_trust_tier()
            .is_some_and(|tier| tier >= self.low_trust_tier)
    }

    pub fn stats(&self, claims: &[ClaimGrounding]) -> GroundingStats {
        let total_claims = claims.len();
        let grounded_claims = claims.iter().filter(|c| c.is_grounded).count();
        let average_confidence = if total_claims == 0 {
            0.0
        } else {
            let sum: f64 = claims.iter().map(|c| c.confidence.weight()).sum();
            round2(sum / total_claims as f64)
        };

        GroundingStats {
            total_claims,
            grounded_claims,
            ungrounded_claims: total_claims - grounded_claims,
            high_confidence_claims: claims
                .iter()
                .filter(|c| c.confidence == ConfidenceLevel::High)
                .count(),
            low_trust_source_claims: claims.iter().filter(|c| self.is_low_trust(c)).count(),
            average_confidence,
        }
    }

    pub fn aggregate(&self, claims: Vec<ClaimGrounding>) -> GroundingVerificationResult {
        let stats = self.stats(&claims);
        let ungrounded_claims: Vec<String> = claims
            .iter()
            .filter(|c| !c.is_grounded)
            .map(|c| c.claim.clone())
            .collect();

        GroundingVerificationResult {
            overall_grounded: stats.ungrounded_claims == 0,
            claims,
            ungrounded_claims,
            stats,
        }
    }
}
