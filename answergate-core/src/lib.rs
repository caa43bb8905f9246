//! # AnswerGate Core
//!
//! Grounding verification and answerability gating for generated answers
//! about financial product rules. Given a draft answer and the chunks it was
//! generated from, the grounding service extracts checkable claims, finds the
//! sentences that support each one, rates confidence and aggregates the
//! result. The answerability gate then makes the final refuse/proceed call.
//!
//! Everything here is synchronous and free of I/O apart from configuration
//! loading. Services hold only immutable configuration and are `Send + Sync`.

pub mod aggregator;
pub mod classifier;
pub mod confidence;
pub mod config;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod grounding;
pub mod matcher;
pub mod patterns;
pub mod refusal;
pub mod retrieval;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{AnswerGateConfig, GateConfig, GroundingConfig, RetrievalConfig, load_config};
pub use error::{AnswerGateError, ConfigError, Result};
pub use gate::{AnswerabilityGate, ComputeIntent, ComputeRequest, GateResult};
pub use grounding::GroundingService;
pub use refusal::RefusalKind;
pub use retrieval::{Freshness, RetrievalQuality};
pub use types::{
    ChunkMetadata, CitedSpan, ClaimGrounding, ClaimType, ConfidenceLevel, GroundingResult,
    GroundingStats, GroundingVerdict, GroundingVerificationResult, ProvenanceChunk,
};
