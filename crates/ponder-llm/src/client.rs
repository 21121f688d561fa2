//! Model client trait and the HTTP implementation for OpenAI-compatible
//! completion endpoints (vLLM et al.).

use crate::types::{EndpointConfig, InferenceRequest, InferenceResponse};
use ponder_core::{Error, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Inference backend abstraction. Implementations must be safe for
/// concurrent `generate` calls.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse>;

    /// True if the endpoint currently answers. Never errors.
    async fn health_check(&self) -> bool;

    async fn close(&self);
}

pub struct HttpModelClient {
    config: EndpointConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Deserialize, Default)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: CompletionUsage,
}

impl HttpModelClient {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("http client init: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse> {
        let start = Instant::now();

        // Cap to the endpoint's own limit on a local copy; the caller's
        // request is never mutated.
        let mut request = request;
        request.max_tokens = request.max_tokens.min(self.config.max_tokens);

        let payload = serde_json::json!({
            "model": self.config.model_name,
            "prompt": request.prompt,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "top_p": request.top_p,
            "stop": request.stop,
        });

        debug!(tier = %self.config.tier, model = %self.config.model_name, "completion request");

        let response = self
            .client
            .post(format!("{}/v1/completions", self.config.url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::model_error(self.config.tier.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::model_error(
                self.config.tier.as_str(),
                format!("{status}: {body}"),
            ));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::model_error(self.config.tier.as_str(), e.to_string()))?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let choice = result.choices.into_iter().next().ok_or_else(|| {
            Error::model_error(self.config.tier.as_str(), "empty choices in response")
        })?;

        Ok(InferenceResponse {
            text: choice.text,
            model_used: self.config.model_name.clone(),
            prompt_tokens: result.usage.prompt_tokens,
            completion_tokens: result.usage.completion_tokens,
            total_tokens: result.usage.total_tokens,
            latency_ms,
            tier_used: self.config.tier,
        })
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn close(&self) {
        // reqwest pools are released on drop
    }
}
