//! Configuration system for AnswerGate.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment -> explicit overrides.
//! Configuration is loaded from `~/.config/answergate/config.toml` and/or
//! `.answergate/config.toml` in the workspace directory.
//!
//! Thresholds and the stop-word list live here rather than as module
//! constants so tests can pin exact boundaries.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Closed list of English function words ignored during key-term extraction.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "being", "both", "but", "by", "can", "could", "did", "do", "does", "each", "for", "from",
    "had", "has", "have", "her", "his", "how", "if", "in", "into", "is", "it", "its", "just",
    "more", "most", "my", "no", "not", "now", "of", "on", "only", "or", "other", "our", "out",
    "over", "per", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "to", "too", "up", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "why", "will", "with",
    "would", "you", "your",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerGateConfig {
    pub grounding: GroundingConfig,
    pub gate: GateConfig,
    pub retrieval: RetrievalConfig,
}

/// Claim extraction, span matching and confidence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Sentences shorter than this (in characters) are never claims.
    pub min_claim_chars: usize,
    /// Minimum fraction of claim terms that must appear in a chunk.
    pub min_term_overlap: f64,
    /// Minimum Jaccard similarity for a chunk sentence to become a span.
    pub min_span_similarity: f64,
    /// Tokens shorter than this are not key terms.
    pub min_term_len: usize,
    /// Spans at or below this tier count as high-trust.
    pub high_trust_tier: u8,
    /// Claims supported only at or above this tier count as low-trust.
    pub low_trust_tier: u8,
    pub stop_words: Vec<String>,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            min_claim_chars: 15,
            min_term_overlap: 0.25,
            min_span_similarity: 0.25,
            min_term_len: 3,
            high_trust_tier: 1,
            low_trust_tier: 2,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Answerability gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Explain-only answers need a top retrieval score at least this high.
    pub min_top_score: f64,
    /// Explain-only answers need at least this many retrieved results.
    pub min_results: usize,
    /// Minimum fraction of grounded claims before an answer may be shown.
    pub min_grounded_percentage: f64,
    /// How many ungrounded claims a refusal quotes.
    pub max_cited_claims: usize,
    /// Substrings in request parameters that mark a request as time-sensitive.
    pub time_sensitive_terms: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_top_score: 0.5,
            min_results: 2,
            min_grounded_percentage: 0.6,
            max_cited_claims: 3,
            time_sensitive_terms: ["promo", "limited", "expir", "today", "current"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// Retrieval-quality summarization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Sources older than this are stale.
    pub stale_after_days: i64,
    /// Chunks at or below this tier are official sources.
    pub official_max_tier: u8,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            stale_after_days: 30,
            official_max_tier: 0,
        }
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

impl AnswerGateConfig {
    /// Reject values the pipeline cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grounding;
        check_fraction("grounding.min_term_overlap", g.min_term_overlap)?;
        check_fraction("grounding.min_span_similarity", g.min_span_similarity)?;
        if g.stop_words.is_empty() {
            return Err(ConfigError::Invalid {
                message: "grounding.stop_words must not be empty".into(),
            });
        }
        if g.low_trust_tier <= g.high_trust_tier {
            return Err(ConfigError::Invalid {
                message: format!(
                    "grounding.low_trust_tier ({}) must be greater than grounding.high_trust_tier ({})",
                    g.low_trust_tier, g.high_trust_tier
                ),
            });
        }

        check_fraction("gate.min_top_score", self.gate.min_top_score)?;
        check_fraction(
            "gate.min_grounded_percentage",
            self.gate.min_grounded_percentage,
        )?;

        if self.retrieval.stale_after_days < 0 {
            return Err(ConfigError::Invalid {
                message: "retrieval.stale_after_days must not be negative".into(),
            });
        }
        Ok(())
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "answergate", "answergate")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".answergate").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `ANSWERGATE_`)
/// 3. Workspace-local config (`.answergate/config.toml`)
/// 4. User config (`~/.config/answergate/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AnswerGateConfig>,
) -> Result<AnswerGateConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AnswerGateConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // ANSWERGATE_GATE__MIN_TOP_SCORE, ANSWERGATE_GROUNDING__MIN_CLAIM_CHARS, etc.
    figment = figment.merge(Env::prefixed("ANSWERGATE_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: AnswerGateConfig = figment.extract()?;
    config.validate()?;
    tracing::debug!(
        workspace = ?workspace.map(|w| w.display().to_string()),
        "Loaded configuration"
    );
    Ok(config)
}

/// Write the default configuration to `<workspace>/.answergate/config.toml`.
///
/// Returns `Ok(None)` without touching the file when one already exists.
pub fn write_default_config(workspace: &Path) -> crate::Result<Option<PathBuf>> {
    let path = workspace_config_path(workspace);
    if path.exists() {
        return Ok(None);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let toml_str = toml::to_string_pretty(&AnswerGateConfig::default()).map_err(|e| {
        ConfigError::Encode {
            message: e.to_string(),
        }
    })?;
    std::fs::write(&path, toml_str)?;
    Ok(Some(path))
}
