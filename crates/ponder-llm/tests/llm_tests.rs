//! Tests for ponder-llm: types, mock client, budget manager, and router

use ponder_core::{CognitiveTier, Error};
use ponder_llm::*;

// ===========================================================================
// ModelTier
// ===========================================================================

#[test]
fn model_tiers_are_ordered() {
    assert!(ModelTier::Small < ModelTier::Medium);
    assert!(ModelTier::Medium < ModelTier::Large);
}

#[test]
fn next_lower_walks_the_ladder() {
    assert_eq!(ModelTier::Large.next_lower(), Some(ModelTier::Medium));
    assert_eq!(ModelTier::Medium.next_lower(), Some(ModelTier::Small));
    assert_eq!(ModelTier::Small.next_lower(), None);
}

#[test]
fn cognitive_to_model_tier_mapping() {
    assert_eq!(model_tier_for(CognitiveTier::Reflex), ModelTier::Small);
    assert_eq!(model_tier_for(CognitiveTier::Reactive), ModelTier::Medium);
    assert_eq!(model_tier_for(CognitiveTier::Deliberate), ModelTier::Large);
    assert_eq!(model_tier_for(CognitiveTier::Analytical), ModelTier::Large);
    assert_eq!(model_tier_for(CognitiveTier::Comprehensive), ModelTier::Large);
}

#[test]
fn inference_request_defaults() {
    let req = InferenceRequest::default();
    assert_eq!(req.max_tokens, 256);
    assert!((req.temperature - 0.7).abs() < 1e-6);
    assert!((req.top_p - 0.95).abs() < 1e-6);
    assert!(req.stop.is_empty());
}

// ===========================================================================
// MockModelClient
// ===========================================================================

fn small_mock() -> MockModelClient {
    let [small, _, _] = EndpointConfig::defaults();
    MockModelClient::new(small)
}

#[tokio::test(start_paused = true)]
async fn mock_generates_and_tracks_calls() {
    let client = small_mock();
    let req = InferenceRequest::new("hello world", 100);

    let resp = client.generate(req).await.unwrap();
    assert!(!resp.text.is_empty());
    assert_eq!(resp.tier_used, ModelTier::Small);
    assert_eq!(resp.total_tokens, resp.prompt_tokens + resp.completion_tokens);
    assert!(resp.total_tokens > 0);

    assert_eq!(client.call_count(), 1);
    assert_eq!(client.last_request().unwrap().prompt, "hello world");
    assert_eq!(client.total_tokens(), u64::from(resp.total_tokens));

    client.reset_history();
    assert_eq!(client.call_count(), 0);
    assert_eq!(client.total_tokens(), 0);
}

#[tokio::test(start_paused = true)]
async fn mock_truncates_to_token_budget() {
    let client = small_mock();
    let resp = client
        .generate(InferenceRequest::new("hi", 5))
        .await
        .unwrap();
    // ~1.3 tokens/word: a 5-token budget allows at most 3 words
    assert!(resp.text.split_whitespace().count() <= 4);
    assert!(resp.text.ends_with("..."));
}

#[tokio::test(start_paused = true)]
async fn mock_failure_injection() {
    let client = small_mock();
    client.set_failure_rate(1.0);
    let err = client
        .generate(InferenceRequest::new("hi", 50))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ModelError { .. }));

    client.set_failure_rate(0.0);
    assert!(client.generate(InferenceRequest::new("hi", 50)).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn mock_health_is_configurable() {
    let client = small_mock();
    assert!(client.health_check().await);
    client.set_healthy(false);
    assert!(!client.health_check().await);
}

// ===========================================================================
// TokenBudgetManager
// ===========================================================================

#[test]
fn record_usage_accumulates() {
    let budget = TokenBudgetManager::with_hourly_budget(15.0);
    budget.record_usage(ModelTier::Small, 100, "agent-1");
    budget.record_usage(ModelTier::Small, 50, "agent-1");
    budget.record_usage(ModelTier::Large, 200, "agent-2");

    assert_eq!(budget.tier_tokens(ModelTier::Small), 150);
    assert_eq!(budget.tier_tokens(ModelTier::Large), 200);
    assert_eq!(budget.agent_usage("agent-1"), 150);
    assert_eq!(budget.agent_usage("agent-2"), 200);
    assert_eq!(budget.agent_usage("unknown"), 0);
}

#[test]
fn utilization_is_cost_over_allocation() {
    let budget = TokenBudgetManager::with_hourly_budget(1.0);
    // 500k LARGE tokens cost 0.0049 * 500 = $2.45 against a $0.50 slice
    budget.record_usage(ModelTier::Large, 500_000, "agent-1");

    let status = budget.status();
    let large = &status.by_tier[&ModelTier::Large];
    assert!((large.cost_usd - 2.45).abs() < 1e-9);
    assert!((large.budget_usd - 0.5).abs() < 1e-9);
    assert!(large.utilization > 4.0);
    assert!(large.is_throttled);
    assert!(status.overall_utilization > 2.0);
}

#[test]
fn throttle_uses_per_tier_thresholds() {
    let budget = TokenBudgetManager::with_hourly_budget(1.0);
    assert!(!budget.should_throttle(ModelTier::Large));

    budget.record_usage(ModelTier::Large, 500_000, "agent-1");
    assert!(budget.should_throttle(ModelTier::Large));
    assert!(!budget.should_throttle(ModelTier::Medium));
    assert!(!budget.should_throttle(ModelTier::Small));
}

#[test]
fn downgrade_recommends_next_unthrottled_tier() {
    let budget = TokenBudgetManager::with_hourly_budget(1.0);
    budget.record_usage(ModelTier::Large, 500_000, "agent-1");

    assert_eq!(budget.recommend_downgrade(ModelTier::Large), Some(ModelTier::Medium));
    assert_eq!(budget.recommend_downgrade(ModelTier::Small), None);

    // Saturate MEDIUM too: $0.25 slice, 0.0012/1k -> 300k tokens = $0.36
    budget.record_usage(ModelTier::Medium, 300_000, "agent-1");
    assert_eq!(budget.recommend_downgrade(ModelTier::Large), None);
}

#[test]
fn reset_zeroes_all_counters() {
    let budget = TokenBudgetManager::with_hourly_budget(15.0);
    budget.record_usage(ModelTier::Large, 10_000, "agent-1");
    budget.reset();

    let status = budget.status();
    assert_eq!(status.total_cost_usd, 0.0);
    assert_eq!(status.overall_utilization, 0.0);
    assert_eq!(budget.tier_tokens(ModelTier::Large), 0);
    assert_eq!(budget.agent_usage("agent-1"), 0);
}

#[test]
fn hour_window_resets_after_expiry() {
    let budget = TokenBudgetManager::with_hourly_budget(15.0);
    budget.record_usage(ModelTier::Small, 500, "agent-1");
    assert_eq!(budget.tier_tokens(ModelTier::Small), 500);

    // Shift the window two hours back: the next operation starts fresh,
    // so a straddling recording lands in the new window only.
    budget.backdate_window(chrono::Duration::hours(2));
    budget.record_usage(ModelTier::Small, 42, "agent-1");
    assert_eq!(budget.tier_tokens(ModelTier::Small), 42);
}

#[test]
fn top_agents_sorted_by_usage() {
    let budget = TokenBudgetManager::with_hourly_budget(15.0);
    budget.record_usage(ModelTier::Small, 10, "low");
    budget.record_usage(ModelTier::Small, 500, "high");
    budget.record_usage(ModelTier::Small, 100, "mid");

    let status = budget.status();
    assert_eq!(status.top_agents[0].0, "high");
    assert_eq!(status.top_agents[1].0, "mid");
    assert_eq!(status.top_agents[2].0, "low");
}

// ===========================================================================
// ModelRouter
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn route_uses_mapped_tier_and_records_usage() {
    let (router, mocks) = mock_router(15.0);

    let resp = router
        .route(CognitiveTier::Reflex, InferenceRequest::new("ping", 100), "agent-1")
        .await
        .unwrap();

    assert_eq!(resp.tier_used, ModelTier::Small);
    assert_eq!(mocks[&ModelTier::Small].call_count(), 1);
    assert_eq!(
        router.budget().tier_tokens(ModelTier::Small),
        u64::from(resp.total_tokens)
    );
    assert!(router.budget().tier_tokens(ModelTier::Small) > 0);
}

#[tokio::test(start_paused = true)]
async fn route_caps_max_tokens_to_tier_budget() {
    let (router, mocks) = mock_router(15.0);

    router
        .route(CognitiveTier::Reflex, InferenceRequest::new("ping", 10_000), "agent-1")
        .await
        .unwrap();

    let seen = mocks[&ModelTier::Small].last_request().unwrap();
    assert_eq!(seen.max_tokens, 150);
}

#[tokio::test(start_paused = true)]
async fn budget_pressure_downgrades_deliberate_to_medium() {
    let (router, mocks) = mock_router(1.0);
    router.budget().record_usage(ModelTier::Large, 500_000, "seed");

    let resp = router
        .route(CognitiveTier::Deliberate, InferenceRequest::new("think", 1200), "agent-1")
        .await
        .unwrap();

    assert_eq!(resp.tier_used, ModelTier::Medium);
    assert_eq!(mocks[&ModelTier::Large].call_count(), 0);

    let decision = router.routing_history(1).pop().unwrap();
    assert_eq!(decision.cognitive_tier, CognitiveTier::Deliberate);
    assert_eq!(decision.target_model_tier, ModelTier::Large);
    assert_eq!(decision.actual_model_tier, ModelTier::Medium);
    assert!(decision.was_downgraded);
    assert_eq!(decision.downgrade_reason.as_deref(), Some("budget_throttle"));
}

#[tokio::test(start_paused = true)]
async fn unhealthy_tier_falls_back_downward() {
    let (router, mocks) = mock_router(15.0);
    router.set_tier_health(ModelTier::Large, false);

    let resp = router
        .route(CognitiveTier::Deliberate, InferenceRequest::new("think", 1200), "agent-1")
        .await
        .unwrap();

    assert_eq!(resp.tier_used, ModelTier::Medium);
    assert_eq!(mocks[&ModelTier::Large].call_count(), 0);

    let decision = router.routing_history(1).pop().unwrap();
    assert_eq!(decision.downgrade_reason.as_deref(), Some("unhealthy"));
}

#[tokio::test(start_paused = true)]
async fn budget_downgrade_takes_precedence_over_health_fallback() {
    let (router, _mocks) = mock_router(1.0);
    router.budget().record_usage(ModelTier::Large, 500_000, "seed");
    router.set_tier_health(ModelTier::Large, false);

    router
        .route(CognitiveTier::Deliberate, InferenceRequest::new("think", 1200), "agent-1")
        .await
        .unwrap();

    let decision = router.routing_history(1).pop().unwrap();
    assert_eq!(decision.downgrade_reason.as_deref(), Some("budget_throttle"));
}

#[tokio::test(start_paused = true)]
async fn timeout_falls_back_exactly_once() {
    let (router, mocks) = mock_router(15.0);
    // LARGE: 1000ms base x4 = 4000ms, past the 3000ms DELIBERATE deadline.
    mocks[&ModelTier::Large].set_latency_range(1000, 1000);
    mocks[&ModelTier::Medium].set_latency_range(10, 20);

    let resp = router
        .route(CognitiveTier::Deliberate, InferenceRequest::new("think", 1200), "agent-1")
        .await
        .unwrap();

    assert_eq!(resp.tier_used, ModelTier::Medium);
    assert_eq!(mocks[&ModelTier::Large].call_count(), 1);
    assert_eq!(mocks[&ModelTier::Medium].call_count(), 1);

    // Usage is charged to the tier that answered
    assert_eq!(router.budget().tier_tokens(ModelTier::Large), 0);
    assert!(router.budget().tier_tokens(ModelTier::Medium) > 0);

    // Timeout alone does not poison health
    assert!(router.status().health[&ModelTier::Large]);
}

#[tokio::test(start_paused = true)]
async fn timeout_without_fallback_is_no_model_available() {
    let (router, mocks) = mock_router(15.0);
    mocks[&ModelTier::Large].set_latency_range(1000, 1000);
    router.set_tier_health(ModelTier::Medium, false);

    let err = router
        .route(CognitiveTier::Deliberate, InferenceRequest::new("think", 1200), "agent-1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoModelAvailable(_)));
}

#[tokio::test(start_paused = true)]
async fn client_error_marks_tier_unhealthy_and_propagates() {
    let (router, mocks) = mock_router(15.0);
    mocks[&ModelTier::Small].set_failure_rate(1.0);

    let err = router
        .route(CognitiveTier::Reflex, InferenceRequest::new("ping", 100), "agent-1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ModelError { .. }));
    assert!(!router.status().health[&ModelTier::Small]);

    // SMALL has no fallback: the router tries it anyway on the next call
    mocks[&ModelTier::Small].set_failure_rate(0.0);
    let resp = router
        .route(CognitiveTier::Reflex, InferenceRequest::new("ping", 100), "agent-1")
        .await
        .unwrap();
    assert_eq!(resp.tier_used, ModelTier::Small);
}

#[tokio::test(start_paused = true)]
async fn check_health_refreshes_cached_status() {
    let (router, mocks) = mock_router(15.0);
    mocks[&ModelTier::Medium].set_healthy(false);

    let results = router.check_health().await;
    assert!(!results[&ModelTier::Medium]);
    assert!(results[&ModelTier::Small]);

    let status = router.status();
    assert!(!status.health[&ModelTier::Medium]);
    assert!(status.last_health_check.is_some());

    // Recovery is observed on the next probe
    mocks[&ModelTier::Medium].set_healthy(true);
    let results = router.check_health().await;
    assert!(results[&ModelTier::Medium]);
}

#[tokio::test(start_paused = true)]
async fn routing_history_is_a_bounded_ring() {
    let (router, mocks) = mock_router(15.0);
    mocks[&ModelTier::Small].set_latency_range(0, 0);

    for _ in 0..105 {
        router
            .route(CognitiveTier::Reflex, InferenceRequest::new("ping", 50), "agent-1")
            .await
            .unwrap();
    }

    assert_eq!(router.routing_history(1000).len(), 100);
    assert_eq!(router.routing_history(10).len(), 10);
}

#[tokio::test(start_paused = true)]
async fn active_requests_returns_to_zero() {
    let (router, _mocks) = mock_router(15.0);
    router
        .route(CognitiveTier::Reflex, InferenceRequest::new("ping", 50), "agent-1")
        .await
        .unwrap();
    assert_eq!(router.status().active_requests, 0);
}
