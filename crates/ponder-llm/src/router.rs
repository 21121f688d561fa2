//! Routes inference requests from cognitive tiers to model tiers, with
//! budget-aware downgrade, health-aware fallback, and timeout handling.

use crate::budget::{BudgetStatus, TokenBudgetManager};
use crate::client::ModelClient;
use crate::mock::mock_clients;
use crate::types::{InferenceRequest, InferenceResponse, ModelTier};
use chrono::{DateTime, Utc};
use ponder_core::{tier_config, CognitiveTier, Error, Result};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

const MAX_HISTORY: usize = 100;

/// Cognitive tier to model tier mapping. REFLEX runs on the small model,
/// REACTIVE on the medium, everything deeper on the large.
pub fn model_tier_for(tier: CognitiveTier) -> ModelTier {
    match tier {
        CognitiveTier::Reflex => ModelTier::Small,
        CognitiveTier::Reactive => ModelTier::Medium,
        CognitiveTier::Deliberate | CognitiveTier::Analytical | CognitiveTier::Comprehensive => {
            ModelTier::Large
        }
    }
}

/// Record of one routing decision, kept for debugging and metrics.
#[derive(Clone, Debug, Serialize)]
pub struct RoutingDecision {
    pub cognitive_tier: CognitiveTier,
    pub target_model_tier: ModelTier,
    pub actual_model_tier: ModelTier,
    pub was_downgraded: bool,
    pub downgrade_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Router status snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct RouterStatus {
    pub health: HashMap<ModelTier, bool>,
    pub budget: BudgetStatus,
    pub last_health_check: Option<DateTime<Utc>>,
    pub active_requests: usize,
}

struct RouterState {
    health: HashMap<ModelTier, bool>,
    last_health_check: Option<DateTime<Utc>>,
    history: VecDeque<RoutingDecision>,
}

pub struct ModelRouter {
    clients: HashMap<ModelTier, Arc<dyn ModelClient>>,
    budget: TokenBudgetManager,
    state: Mutex<RouterState>,
    active_requests: AtomicUsize,
}

/// Decrements the active-request gauge on every exit path.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl ModelRouter {
    pub fn new(
        clients: HashMap<ModelTier, Arc<dyn ModelClient>>,
        budget: TokenBudgetManager,
    ) -> Self {
        Self {
            clients,
            budget,
            state: Mutex::new(RouterState {
                health: ModelTier::ALL.iter().map(|t| (*t, true)).collect(),
                last_health_check: None,
                history: VecDeque::with_capacity(MAX_HISTORY),
            }),
            active_requests: AtomicUsize::new(0),
        }
    }

    pub fn budget(&self) -> &TokenBudgetManager {
        &self.budget
    }

    /// Route a request to the appropriate model tier.
    ///
    /// Selection order: budget downgrade is tested first, then health
    /// fallback. A timeout triggers at most one further fallback step, so a
    /// single request moves at most two tiers down.
    pub async fn route(
        &self,
        cognitive_tier: CognitiveTier,
        request: InferenceRequest,
        agent_id: &str,
    ) -> Result<InferenceResponse> {
        self.active_requests.fetch_add(1, Ordering::Relaxed);
        let _guard = ActiveGuard(&self.active_requests);

        let config = tier_config(cognitive_tier);
        let target = model_tier_for(cognitive_tier);
        let (actual, reason) = self.select_tier(target);

        self.record_decision(RoutingDecision {
            cognitive_tier,
            target_model_tier: target,
            actual_model_tier: actual,
            was_downgraded: actual != target,
            downgrade_reason: reason.clone(),
            timestamp: Utc::now(),
        });

        if let Some(reason) = &reason {
            info!(
                "routing {}: {} -> {} ({})",
                cognitive_tier, target, actual, reason
            );
        }

        let client = self.client_for(actual)?;
        let mut request = request;
        request.max_tokens = request.max_tokens.min(config.max_tokens);

        let deadline = Duration::from_millis(config.timeout_ms);
        match tokio::time::timeout(deadline, client.generate(request.clone())).await {
            Ok(Ok(response)) => {
                self.budget
                    .record_usage(actual, u64::from(response.total_tokens), agent_id);
                Ok(response)
            }
            Ok(Err(e)) => {
                // Non-timeout failure: take the tier out of rotation
                self.set_tier_health(actual, false);
                Err(e)
            }
            Err(_) => {
                warn!("timeout on {} after {}ms, trying fallback", actual, config.timeout_ms);
                self.handle_timeout(cognitive_tier, request, agent_id, actual)
                    .await
            }
        }
    }

    fn select_tier(&self, target: ModelTier) -> (ModelTier, Option<String>) {
        if self.budget.should_throttle(target) {
            if let Some(downgrade) = self.budget.recommend_downgrade(target) {
                return (downgrade, Some("budget_throttle".to_string()));
            }
        }

        if !self.is_healthy(target) {
            if let Some(fallback) = self.healthy_fallback(target) {
                return (fallback, Some("unhealthy".to_string()));
            }
            // No fallback available, try anyway
            warn!("no healthy fallback for {}", target);
        }

        (target, None)
    }

    fn healthy_fallback(&self, tier: ModelTier) -> Option<ModelTier> {
        let fallback = tier.next_lower()?;
        if self.is_healthy(fallback) {
            Some(fallback)
        } else {
            None
        }
    }

    async fn handle_timeout(
        &self,
        cognitive_tier: CognitiveTier,
        request: InferenceRequest,
        agent_id: &str,
        failed_tier: ModelTier,
    ) -> Result<InferenceResponse> {
        let Some(fallback) = self.healthy_fallback(failed_tier) else {
            return Err(Error::NoModelAvailable(format!(
                "no fallback for {} after timeout",
                cognitive_tier
            )));
        };

        let client = self.client_for(fallback)?;
        match client.generate(request).await {
            Ok(response) => {
                self.budget
                    .record_usage(fallback, u64::from(response.total_tokens), agent_id);
                Ok(response)
            }
            Err(e) => {
                self.set_tier_health(fallback, false);
                Err(e)
            }
        }
    }

    fn client_for(&self, tier: ModelTier) -> Result<&Arc<dyn ModelClient>> {
        self.clients
            .get(&tier)
            .ok_or_else(|| Error::NoModelAvailable(format!("no client registered for {tier}")))
    }

    fn is_healthy(&self, tier: ModelTier) -> bool {
        self.state
            .lock()
            .unwrap()
            .health
            .get(&tier)
            .copied()
            .unwrap_or(false)
    }

    /// Probe every client and refresh cached health. This is the only path
    /// (besides `set_tier_health`) that promotes a tier back to healthy.
    pub async fn check_health(&self) -> HashMap<ModelTier, bool> {
        let mut results = HashMap::new();
        for (tier, client) in &self.clients {
            results.insert(*tier, client.health_check().await);
        }

        let mut state = self.state.lock().unwrap();
        for (tier, healthy) in &results {
            state.health.insert(*tier, *healthy);
        }
        state.last_health_check = Some(Utc::now());
        results
    }

    /// Test hook: force a tier's health status.
    pub fn set_tier_health(&self, tier: ModelTier, healthy: bool) {
        self.state.lock().unwrap().health.insert(tier, healthy);
    }

    pub fn status(&self) -> RouterStatus {
        let state = self.state.lock().unwrap();
        RouterStatus {
            health: state.health.clone(),
            budget: self.budget.status(),
            last_health_check: state.last_health_check,
            active_requests: self.active_requests.load(Ordering::Relaxed),
        }
    }

    /// Most recent routing decisions, oldest first, capped at `limit`.
    pub fn routing_history(&self, limit: usize) -> Vec<RoutingDecision> {
        let state = self.state.lock().unwrap();
        let skip = state.history.len().saturating_sub(limit);
        state.history.iter().skip(skip).cloned().collect()
    }

    fn record_decision(&self, decision: RoutingDecision) {
        let mut state = self.state.lock().unwrap();
        if state.history.len() == MAX_HISTORY {
            state.history.pop_front();
        }
        state.history.push_back(decision);
    }

    pub async fn close(&self) {
        for client in self.clients.values() {
            client.close().await;
        }
    }
}

impl std::fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        let healthy = state.health.values().filter(|h| **h).count();
        f.debug_struct("ModelRouter")
            .field("healthy", &format!("{}/{}", healthy, state.health.len()))
            .field(
                "active_requests",
                &self.active_requests.load(Ordering::Relaxed),
            )
            .finish()
    }
}

/// Router over mock clients, for tests and local development.
pub fn mock_router(hourly_budget_usd: f64) -> (ModelRouter, HashMap<ModelTier, Arc<crate::mock::MockModelClient>>) {
    let mocks = mock_clients();
    let clients: HashMap<ModelTier, Arc<dyn ModelClient>> = mocks
        .iter()
        .map(|(tier, client)| (*tier, client.clone() as Arc<dyn ModelClient>))
        .collect();
    let budget = TokenBudgetManager::with_hourly_budget(hourly_budget_usd);
    (ModelRouter::new(clients, budget), mocks)
}
