//! Claim classification by first match over the precedence-ordered pattern table.

use std::sync::Arc;

use crate::patterns::ClaimPatterns;
use crate::types::ClaimType;

/// Assigns exactly one [`ClaimType`] to a claim.
///
/// Precedence is temporal, procedural, opinion, comparative, factual, then
/// unknown. A sentence with both a year and an assertion verb is temporal.
pub struct ClaimClassifier {
    patterns: Arc<ClaimPatterns>,
}

impl ClaimClassifier {
    pub fn new() -> Self {
        Self::with_patterns(Arc::new(ClaimPatterns::new()))
    }

    pub fn with_patterns(patterns: Arc<ClaimPatterns>) -> Self {
        Self { patterns }
    }

    pub fn classify(&self, claim: &str) -> ClaimType {
        self.patterns
            .families()
            .iter()
            .find(|family| family.is_match(claim))
            .map(|family| family.tag())
            .unwrap_or(ClaimType::Unknown)
    }
}

impl Default for ClaimClassifier {
    fn default() -> Self {
        Self::new()
    }
}
