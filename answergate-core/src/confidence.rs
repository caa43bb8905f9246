//! Confidence assessment from claim type and supporting spans.

use crate::config::GroundingConfig;
use crate::types::{CitedSpan, ClaimType, ConfidenceLevel};

/// Maps a claim's type and spans to a [`ConfidenceLevel`].
///
/// Rules, in order:
/// 1. no spans: `None`
/// 2. opinion or temporal: `Medium` with a high-trust span, else `Low`
/// 3. anything else: `High` with a high-trust span, `Medium` with two or more
///    spans, else `Low`
pub struct ConfidenceAssessor {
    high_trust_tier: u8,
}

impl ConfidenceAssessor {
    pub fn new(config: &GroundingConfig) -> Self {
        Self {
            high_trust_tier: config.high_trust_tier,
        }
    }

    pub fn assess(&self, claim_type: ClaimType, spans: &[CitedSpan]) -> ConfidenceLevel {
        if spans.is_empty() {
            return ConfidenceLevel::None;
        }
        let has_high_trust = spans.iter().any(|s| s.trust_tier <= self.high_trust_tier);

        if claim_type.is_capped() {
            return if has_high_trust {
                ConfidenceLevel::Medium
            } else {
                ConfidenceLevel::Low
            };
        }

        if has_high_trust {
            ConfidenceLevel::High
        } else if spans.len() >= 2 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}
