//! Hourly token budget tracking and throttle/downgrade advice.

use crate::types::ModelTier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Budget parameters. Allocation shares are fixed: SMALL 10%, MEDIUM 25%,
/// LARGE 50% of the hourly budget, remainder reserved for overhead.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub hourly_budget_usd: f64,
    pub cost_per_1k: CostPer1k,
    pub throttle: ThrottleThresholds,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CostPer1k {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleThresholds {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            hourly_budget_usd: 15.0,
            cost_per_1k: CostPer1k::default(),
            throttle: ThrottleThresholds::default(),
        }
    }
}

impl Default for CostPer1k {
    fn default() -> Self {
        // Estimates for self-hosted vLLM on cloud GPUs
        Self {
            small: 0.0002,
            medium: 0.0012,
            large: 0.0049,
        }
    }
}

impl Default for ThrottleThresholds {
    fn default() -> Self {
        // The expensive tier throttles earliest
        Self {
            small: 0.95,
            medium: 0.85,
            large: 0.75,
        }
    }
}

impl BudgetConfig {
    pub fn with_hourly_budget(hourly_budget_usd: f64) -> Self {
        Self {
            hourly_budget_usd,
            ..Self::default()
        }
    }

    fn cost_per_1k(&self, tier: ModelTier) -> f64 {
        match tier {
            ModelTier::Small => self.cost_per_1k.small,
            ModelTier::Medium => self.cost_per_1k.medium,
            ModelTier::Large => self.cost_per_1k.large,
        }
    }

    fn threshold(&self, tier: ModelTier) -> f64 {
        match tier {
            ModelTier::Small => self.throttle.small,
            ModelTier::Medium => self.throttle.medium,
            ModelTier::Large => self.throttle.large,
        }
    }

    fn allocation_share(tier: ModelTier) -> f64 {
        match tier {
            ModelTier::Small => 0.10,
            ModelTier::Medium => 0.25,
            ModelTier::Large => 0.50,
        }
    }
}

/// Budget status for a single tier.
#[derive(Clone, Debug, Serialize)]
pub struct TierBudgetStatus {
    pub tier: ModelTier,
    pub tokens_used: u64,
    pub cost_usd: f64,
    pub budget_usd: f64,
    pub utilization: f64,
    pub is_throttled: bool,
}

/// Overall budget status snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct BudgetStatus {
    pub hour_start: DateTime<Utc>,
    pub total_cost_usd: f64,
    pub hourly_budget_usd: f64,
    pub overall_utilization: f64,
    pub by_tier: HashMap<ModelTier, TierBudgetStatus>,
    /// Top agents by token usage this hour, descending.
    pub top_agents: Vec<(String, u64)>,
}

struct Window {
    hour_start: DateTime<Utc>,
    tokens_by_tier: HashMap<ModelTier, u64>,
    tokens_by_agent: HashMap<String, u64>,
}

impl Window {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            hour_start: now,
            tokens_by_tier: ModelTier::ALL.iter().map(|t| (*t, 0)).collect(),
            tokens_by_agent: HashMap::new(),
        }
    }
}

/// Thread-safe hourly budget manager. One mutex guards the whole window;
/// every operation first rolls the window forward if the hour has lapsed,
/// so a recording that straddles the boundary lands in the new window.
pub struct TokenBudgetManager {
    config: BudgetConfig,
    window: Mutex<Window>,
}

impl TokenBudgetManager {
    pub fn new(config: BudgetConfig) -> Self {
        Self {
            config,
            window: Mutex::new(Window::fresh(Utc::now())),
        }
    }

    pub fn with_hourly_budget(hourly_budget_usd: f64) -> Self {
        Self::new(BudgetConfig::with_hourly_budget(hourly_budget_usd))
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// Record token usage. Never fails.
    pub fn record_usage(&self, tier: ModelTier, tokens: u64, agent_id: &str) {
        let mut window = self.window.lock().unwrap();
        Self::maybe_reset_hour(&mut window);
        *window.tokens_by_tier.entry(tier).or_insert(0) += tokens;
        *window
            .tokens_by_agent
            .entry(agent_id.to_string())
            .or_insert(0) += tokens;
    }

    /// True iff the tier's utilization exceeds its throttle threshold.
    pub fn should_throttle(&self, tier: ModelTier) -> bool {
        let mut window = self.window.lock().unwrap();
        Self::maybe_reset_hour(&mut window);
        self.tier_utilization(&window, tier) > self.config.threshold(tier)
    }

    /// The next-lower tier, iff it is not itself throttled. None if the
    /// request is already at SMALL or the lower tier is saturated too.
    pub fn recommend_downgrade(&self, tier: ModelTier) -> Option<ModelTier> {
        let downgrade = tier.next_lower()?;
        if self.should_throttle(downgrade) {
            return None;
        }
        Some(downgrade)
    }

    pub fn agent_usage(&self, agent_id: &str) -> u64 {
        let mut window = self.window.lock().unwrap();
        Self::maybe_reset_hour(&mut window);
        window.tokens_by_agent.get(agent_id).copied().unwrap_or(0)
    }

    pub fn tier_tokens(&self, tier: ModelTier) -> u64 {
        let mut window = self.window.lock().unwrap();
        Self::maybe_reset_hour(&mut window);
        window.tokens_by_tier.get(&tier).copied().unwrap_or(0)
    }

    /// Full status snapshot for observability.
    pub fn status(&self) -> BudgetStatus {
        let mut window = self.window.lock().unwrap();
        Self::maybe_reset_hour(&mut window);

        let mut by_tier = HashMap::new();
        for tier in ModelTier::ALL {
            let tokens = window.tokens_by_tier.get(&tier).copied().unwrap_or(0);
            let cost = self.cost(tier, tokens);
            let budget = self.config.hourly_budget_usd * BudgetConfig::allocation_share(tier);
            let utilization = if budget > 0.0 { cost / budget } else { 0.0 };
            by_tier.insert(
                tier,
                TierBudgetStatus {
                    tier,
                    tokens_used: tokens,
                    cost_usd: cost,
                    budget_usd: budget,
                    utilization,
                    is_throttled: utilization > self.config.threshold(tier),
                },
            );
        }

        let total_cost: f64 = by_tier.values().map(|s| s.cost_usd).sum();

        let mut top_agents: Vec<(String, u64)> = window
            .tokens_by_agent
            .iter()
            .map(|(id, tokens)| (id.clone(), *tokens))
            .collect();
        top_agents.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_agents.truncate(10);

        BudgetStatus {
            hour_start: window.hour_start,
            total_cost_usd: total_cost,
            hourly_budget_usd: self.config.hourly_budget_usd,
            overall_utilization: if self.config.hourly_budget_usd > 0.0 {
                total_cost / self.config.hourly_budget_usd
            } else {
                0.0
            },
            by_tier,
            top_agents,
        }
    }

    /// Force a fresh window.
    pub fn reset(&self) {
        let mut window = self.window.lock().unwrap();
        *window = Window::fresh(Utc::now());
    }

    /// Test hook: shift the window start backwards to exercise hourly reset.
    pub fn backdate_window(&self, by: Duration) {
        let mut window = self.window.lock().unwrap();
        window.hour_start = window.hour_start - by;
    }

    fn maybe_reset_hour(window: &mut Window) {
        let now = Utc::now();
        if now - window.hour_start > Duration::hours(1) {
            *window = Window::fresh(now);
        }
    }

    fn tier_utilization(&self, window: &Window, tier: ModelTier) -> f64 {
        let tokens = window.tokens_by_tier.get(&tier).copied().unwrap_or(0);
        let cost = self.cost(tier, tokens);
        let budget = self.config.hourly_budget_usd * BudgetConfig::allocation_share(tier);
        if budget > 0.0 {
            cost / budget
        } else {
            0.0
        }
    }

    fn cost(&self, tier: ModelTier, tokens: u64) -> f64 {
        tokens as f64 * self.config.cost_per_1k(tier) / 1000.0
    }
}
