//! Mock model client for tests and GPU-free development.

use crate::client::ModelClient;
use crate::types::{EndpointConfig, InferenceRequest, InferenceResponse, ModelTier};
use ponder_core::{Error, Result};
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tunable mock behavior.
#[derive(Clone, Debug)]
pub struct MockConfig {
    /// Simulated base latency range (min, max) in ms, before tier scaling.
    pub latency_range: (u64, u64),
    /// Probability of a simulated failure (0-1).
    pub failure_rate: f64,
    /// Whether the endpoint reports healthy.
    pub is_healthy: bool,
    /// Tokens-per-word estimate for usage simulation.
    pub tokens_per_word: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_range: (50, 200),
            failure_rate: 0.0,
            is_healthy: true,
            tokens_per_word: 1.3,
        }
    }
}

const SMALL_TEMPLATES: [&str; 3] = [
    "I understand. Let me help with that.",
    "Here's a quick thought on this matter.",
    "Based on my understanding, the answer is straightforward.",
];

const MEDIUM_TEMPLATES: [&str; 3] = [
    "This is an interesting question that requires some consideration. \
     Let me break it down for you step by step.",
    "I've analyzed this carefully. Here's what I think is most relevant \
     to your situation.",
    "There are several factors to consider here. Let me walk you through \
     the key points.",
];

const LARGE_TEMPLATES: [&str; 3] = [
    "This is a complex topic that warrants thorough analysis. \
     Let me provide a comprehensive breakdown of the key considerations, \
     potential approaches, and my recommended path forward. \
     First, we need to understand the underlying context...",
    "Thank you for this thoughtful question. I'll provide a detailed response \
     that covers the theoretical foundations, practical implications, \
     and actionable recommendations. Let's start with the fundamentals...",
    "This requires careful consideration of multiple factors. \
     I'll structure my response to address the immediate concerns, \
     broader implications, and strategic recommendations. \
     Beginning with the core issue...",
];

/// Simulates inference with tier-scaled latency, canned responses,
/// optional failure injection, and call tracking.
pub struct MockModelClient {
    config: EndpointConfig,
    mock: Mutex<MockConfig>,
    call_history: Mutex<Vec<InferenceRequest>>,
    total_tokens: AtomicU64,
}

impl MockModelClient {
    pub fn new(config: EndpointConfig) -> Self {
        Self::with_mock_config(config, MockConfig::default())
    }

    pub fn with_mock_config(config: EndpointConfig, mock: MockConfig) -> Self {
        Self {
            config,
            mock: Mutex::new(mock),
            call_history: Mutex::new(Vec::new()),
            total_tokens: AtomicU64::new(0),
        }
    }

    fn simulate_latency_ms(&self) -> f64 {
        let (min_lat, max_lat) = self.mock.lock().unwrap().latency_range;
        let multiplier = match self.config.tier {
            ModelTier::Small => 1.0,
            ModelTier::Medium => 2.0,
            ModelTier::Large => 4.0,
        };
        let base = if max_lat > min_lat {
            rand::thread_rng().gen_range(min_lat..=max_lat) as f64
        } else {
            min_lat as f64
        };
        base * multiplier
    }

    fn render_response(&self, request: &InferenceRequest, tokens_per_word: f64) -> String {
        let templates: &[&str] = match self.config.tier {
            ModelTier::Small => &SMALL_TEMPLATES,
            ModelTier::Medium => &MEDIUM_TEMPLATES,
            ModelTier::Large => &LARGE_TEMPLATES,
        };
        let pick = rand::thread_rng().gen_range(0..templates.len());
        let response = templates[pick];

        // Rough truncation to the requested token budget
        let words: Vec<&str> = response.split_whitespace().collect();
        let max_words = (f64::from(request.max_tokens) / tokens_per_word) as usize;
        if words.len() > max_words {
            format!("{}...", words[..max_words].join(" "))
        } else {
            response.to_string()
        }
    }

    fn estimate_tokens(text: &str, tokens_per_word: f64) -> u32 {
        (text.split_whitespace().count() as f64 * tokens_per_word) as u32
    }

    // Test helpers

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<InferenceRequest> {
        self.call_history.lock().unwrap().last().cloned()
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens.load(Ordering::Relaxed)
    }

    pub fn reset_history(&self) {
        self.call_history.lock().unwrap().clear();
        self.total_tokens.store(0, Ordering::Relaxed);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.mock.lock().unwrap().is_healthy = healthy;
    }

    pub fn set_failure_rate(&self, rate: f64) {
        self.mock.lock().unwrap().failure_rate = rate.clamp(0.0, 1.0);
    }

    pub fn set_latency_range(&self, min_ms: u64, max_ms: u64) {
        self.mock.lock().unwrap().latency_range = (min_ms, max_ms.max(min_ms));
    }
}

#[async_trait::async_trait]
impl ModelClient for MockModelClient {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse> {
        self.call_history.lock().unwrap().push(request.clone());

        let latency_ms = self.simulate_latency_ms();
        tokio::time::sleep(Duration::from_millis(latency_ms as u64)).await;

        let (failure_rate, tokens_per_word) = {
            let mock = self.mock.lock().unwrap();
            (mock.failure_rate, mock.tokens_per_word)
        };

        if failure_rate > 0.0 && rand::thread_rng().gen::<f64>() < failure_rate {
            return Err(Error::model_error(
                self.config.tier.as_str(),
                "simulated failure",
            ));
        }

        let text = self.render_response(&request, tokens_per_word);
        let prompt_tokens = Self::estimate_tokens(&request.prompt, tokens_per_word);
        let completion_tokens = Self::estimate_tokens(&text, tokens_per_word);
        let total_tokens = prompt_tokens + completion_tokens;

        self.total_tokens
            .fetch_add(u64::from(total_tokens), Ordering::Relaxed);

        Ok(InferenceResponse {
            text,
            model_used: self.config.model_name.clone(),
            prompt_tokens,
            completion_tokens,
            total_tokens,
            latency_ms,
            tier_used: self.config.tier,
        })
    }

    async fn health_check(&self) -> bool {
        // Small delay to simulate the network round trip
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.mock.lock().unwrap().is_healthy
    }

    async fn close(&self) {}
}

/// Mock clients for every tier, keyed for the router.
pub fn mock_clients() -> HashMap<ModelTier, Arc<MockModelClient>> {
    EndpointConfig::defaults()
        .into_iter()
        .map(|config| (config.tier, Arc::new(MockModelClient::new(config))))
        .collect()
}
