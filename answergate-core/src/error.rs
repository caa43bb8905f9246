//! Error types for the AnswerGate core library.
//!
//! Grounding and gating never fail: absent evidence is an outcome, not an
//! error. Errors only arise when loading or validating configuration and at
//! the I/O edges of the crate.

/// Top-level error type for the AnswerGate core library.
#[derive(Debug, thiserror::Error)]
pub enum AnswerGateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Value out of range for {field}: {value} (expected 0.0..=1.0)")]
    OutOfRange { field: String, value: f64 },

    #[error("Failed to load configuration: {message}")]
    Load { message: String },

    #[error("Failed to encode configuration: {message}")]
    Encode { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load {
            message: err.to_string(),
        }
    }
}

/// A type alias for results using the top-level `AnswerGateError`.
pub type Result<T> = std::result::Result<T, AnswerGateError>;
