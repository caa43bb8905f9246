//! Retrieval-quality summaries consumed by the answerability gate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::types::ProvenanceChunk;

/// How recent the retrieved material is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
    Unknown,
}

/// Summary of how good a retrieved set is for the query as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalQuality {
    pub top_score: f64,
    pub average_score: f64,
    pub num_results: usize,
    pub has_official_source: bool,
    pub freshness: Freshness,
}

impl RetrievalQuality {
    /// Summarize a retrieved chunk set as of `now`.
    ///
    /// Scores come from the chunks that report one; unscored chunks still
    /// count toward `num_results`. Freshness follows the most recently
    /// retrieved chunk.
    pub fn summarize(
        chunks: &[ProvenanceChunk],
        now: DateTime<Utc>,
        config: &RetrievalConfig,
    ) -> Self {
        let scores: Vec<f64> = chunks
            .iter()
            .filter_map(|c| c.score)
            .map(f64::from)
            .collect();
        let top_score = scores.iter().copied().fold(0.0_f64, f64::max);
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        // A window too large for `Duration` never goes stale.
        let window = Duration::try_days(config.stale_after_days);
        let freshness = match chunks.iter().map(|c| c.metadata.retrieved_at).max() {
            None => Freshness::Unknown,
            Some(newest) => match window {
                Some(window) if now - newest > window => Freshness::Stale,
                _ => Freshness::Fresh,
            },
        };

        Self {
            top_score,
            average_score,
            num_results: chunks.len(),
            has_official_source: chunks
                .iter()
                .any(|c| c.metadata.trust_tier <= config.official_max_tier),
            freshness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::chunk;
    use chrono::TimeZone;

    fn scored(id: &str, tier: u8, score: f32, day: u32) -> ProvenanceChunk {
        let mut c = chunk(id, "content", tier);
        c.score = Some(score);
        c.metadata.retrieved_at = Utc.with_ymd_and_hms(2026, 10, day, 0, 0, 0).unwrap();
        c
    }

    #[test]
    fn test_summarize_scores_and_sources() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        let chunks = vec![scored("a", 2, 0.5, 10), scored("b", 0, 0.75, 12)];
        let quality = RetrievalQuality::summarize(&chunks, now, &RetrievalConfig::default());
        assert_eq!(quality.top_score, 0.75);
        assert_eq!(quality.average_score, 0.625);
        assert_eq!(quality.num_results, 2);
        assert!(quality.has_official_source);
        assert_eq!(quality.freshness, Freshness::Fresh);
    }

    #[test]
    fn test_summarize_stale() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap();
        let chunks = vec![scored("a", 1, 0.9, 1)];
        let quality = RetrievalQuality::summarize(&chunks, now, &RetrievalConfig::default());
        assert_eq!(quality.freshness, Freshness::Stale);
        assert!(!quality.has_official_source);
    }

    #[test]
    fn test_unrepresentable_stale_window_never_goes_stale() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap();
        let chunks = vec![scored("a", 1, 0.9, 1)];
        let config = RetrievalConfig {
            stale_after_days: i64::MAX / 2,
            ..RetrievalConfig::default()
        };
        let quality = RetrievalQuality::summarize(&chunks, now, &config);
        assert_eq!(quality.freshness, Freshness::Fresh);
    }

    #[test]
    fn test_summarize_empty() {
        let quality =
            RetrievalQuality::summarize(&[], Utc::now(), &RetrievalConfig::default());
        assert_eq!(quality.num_results, 0);
        assert_eq!(quality.top_score, 0.0);
        assert_eq!(quality.freshness, Freshness::Unknown);
    }

    #[test]
    fn test_unscored_chunks_count_as_results() {
        let now = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap();
        let chunks = vec![chunk("a", "x", 0), chunk("b", "y", 1)];
        let quality = RetrievalQuality::summarize(&chunks, now, &RetrievalConfig::default());
        assert_eq!(quality.num_results, 2);
        assert_eq!(quality.average_score, 0.0);
    }

    #[test]
    fn test_deserialize_external_summary() {
        let json = r#"{"topScore":0.3,"averageScore":0.2,"numResults":5,"hasOfficialSource":false,"freshness":"stale"}"#;
        let quality: RetrievalQuality = serde_json::from_str(json).unwrap();
        assert_eq!(quality.num_results, 5);
        assert_eq!(quality.freshness, Freshness::Stale);
    }
}
