//! Inference request/response types and model tier classification.

use serde::{Deserialize, Serialize};

/// Model tier classification by size and capability.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Fast, for REFLEX
    Small,
    /// Balanced, for REACTIVE
    Medium,
    /// Powerful, for DELIBERATE and above
    Large,
}

impl ModelTier {
    pub const ALL: [ModelTier; 3] = [ModelTier::Small, ModelTier::Medium, ModelTier::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Small => "small",
            ModelTier::Medium => "medium",
            ModelTier::Large => "large",
        }
    }

    /// The next tier down, used for both budget downgrade and health fallback.
    pub fn next_lower(self) -> Option<ModelTier> {
        match self {
            ModelTier::Large => Some(ModelTier::Medium),
            ModelTier::Medium => Some(ModelTier::Small),
            ModelTier::Small => None,
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request for model inference.
#[derive(Clone, Debug, Serialize)]
pub struct InferenceRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

impl Default for InferenceRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            max_tokens: 256,
            temperature: 0.7,
            top_p: 0.95,
            stop: Vec::new(),
        }
    }
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            ..Default::default()
        }
    }
}

/// Response from model inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub text: String,
    pub model_used: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub latency_ms: f64,
    pub tier_used: ModelTier,
}

impl InferenceResponse {
    pub fn tokens_per_second(&self) -> f64 {
        if self.latency_ms <= 0.0 {
            return 0.0;
        }
        f64::from(self.completion_tokens) / self.latency_ms * 1000.0
    }
}

/// Configuration for one model endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub tier: ModelTier,
    pub url: String,
    pub model_name: String,
    /// Hard cap the endpoint enforces on any single completion.
    pub max_tokens: u32,
    pub typical_latency_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    /// Default endpoint layout: one OpenAI-compatible server per tier.
    pub fn defaults() -> [EndpointConfig; 3] {
        [
            EndpointConfig {
                tier: ModelTier::Small,
                url: "http://localhost:8001".to_string(),
                model_name: "Qwen/Qwen2.5-3B-Instruct".to_string(),
                max_tokens: 2048,
                typical_latency_ms: 200,
                timeout_secs: default_timeout_secs(),
            },
            EndpointConfig {
                tier: ModelTier::Medium,
                url: "http://localhost:8002".to_string(),
                model_name: "Qwen/Qwen2.5-7B-Instruct".to_string(),
                max_tokens: 4096,
                typical_latency_ms: 500,
                timeout_secs: default_timeout_secs(),
            },
            EndpointConfig {
                tier: ModelTier::Large,
                url: "http://localhost:8003".to_string(),
                model_name: "Qwen/Qwen2.5-14B-Instruct".to_string(),
                max_tokens: 8192,
                typical_latency_ms: 2000,
                timeout_secs: default_timeout_secs(),
            },
        ]
    }
}
