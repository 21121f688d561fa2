//! Error types for Ponder

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The chosen model tier did not answer within its deadline.
    #[error("model timeout: {tier} did not respond within {timeout_ms}ms")]
    ModelTimeout { tier: String, timeout_ms: u64 },

    /// Non-timeout client failure. The router marks the tier unhealthy.
    #[error("model error: {tier} - {message}")]
    ModelError { tier: String, message: String },

    /// No healthy tier and no fallback succeeded.
    #[error("no model available: {0}")]
    NoModelAvailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn model_timeout(tier: impl Into<String>, timeout_ms: u64) -> Self {
        Self::ModelTimeout {
            tier: tier.into(),
            timeout_ms,
        }
    }

    pub fn model_error(tier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelError {
            tier: tier.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures the router recovers from locally (downgrade/fallback).
    pub fn is_inference_failure(&self) -> bool {
        matches!(
            self,
            Self::ModelTimeout { .. } | Self::ModelError { .. } | Self::NoModelAvailable(_)
        )
    }
}
