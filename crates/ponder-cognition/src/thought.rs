//! Thoughts, processing results, and planned strategies.

use chrono::{DateTime, Utc};
use ponder_core::CognitiveTier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a thought.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtType {
    /// A realization or understanding
    Insight,
    /// A worry or risk identification
    Concern,
    /// Something to ask or clarify
    Question,
    /// Noticing something
    Observation,
    /// An intention or course of action
    Plan,
    /// An immediate response
    Reaction,
}

/// A single unit of cognition. The tier is fixed at creation; only the
/// lifecycle flags change afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Thought {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tier: CognitiveTier,
    pub content: String,
    pub thought_type: ThoughtType,
    /// The purpose string that triggered this thought.
    pub trigger: String,

    // Quality metrics, both in [0, 1]
    pub confidence: f64,
    pub completeness: f64,

    // Lifecycle
    pub externalized: bool,
    pub externalized_at: Option<DateTime<Utc>>,
    pub still_relevant: bool,
    pub superseded_by: Option<Uuid>,

    /// Up to 3 most recent prior thoughts this one builds on.
    pub related_thought_ids: Vec<Uuid>,
}

impl Thought {
    pub fn new(
        tier: CognitiveTier,
        content: impl Into<String>,
        thought_type: ThoughtType,
        trigger: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            tier,
            content: content.into(),
            thought_type,
            trigger: trigger.into(),
            confidence: 0.5,
            completeness: 0.5,
            externalized: false,
            externalized_at: None,
            still_relevant: true,
            superseded_by: None,
            related_thought_ids: Vec::new(),
        }
    }

    pub fn with_quality(mut self, confidence: f64, completeness: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self.completeness = completeness.clamp(0.0, 1.0);
        self
    }
}

/// The result of processing one stimulus through cognitive tiers.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CognitiveResult {
    pub thoughts: Vec<Thought>,
    pub primary_thought: Option<Thought>,
    pub processing_time_ms: f64,
    /// De-duplicated, sorted set of tiers that produced thoughts.
    pub tiers_used: Vec<CognitiveTier>,
    pub agent_id: Option<Uuid>,
    pub stimulus_id: Option<Uuid>,
}

impl CognitiveResult {
    pub fn thought_count(&self) -> usize {
        self.thoughts.len()
    }

    pub fn avg_confidence(&self) -> f64 {
        if self.thoughts.is_empty() {
            return 0.0;
        }
        self.thoughts.iter().map(|t| t.confidence).sum::<f64>() / self.thoughts.len() as f64
    }

    pub fn highest_tier_used(&self) -> Option<CognitiveTier> {
        self.tiers_used.iter().max().copied()
    }
}

/// One step of a processing strategy.
#[derive(Clone, Debug, Serialize)]
pub struct PlannedStep {
    pub tier: CognitiveTier,
    pub purpose: &'static str,
    pub parallel: bool,
    /// Number of concurrent runs for a parallel step.
    pub count: usize,
}

impl PlannedStep {
    pub fn sequential(tier: CognitiveTier, purpose: &'static str) -> Self {
        Self {
            tier,
            purpose,
            parallel: false,
            count: 1,
        }
    }

    pub fn parallel(tier: CognitiveTier, purpose: &'static str, count: usize) -> Self {
        Self {
            tier,
            purpose,
            parallel: true,
            count,
        }
    }
}

/// An ordered cognitive processing plan.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProcessingStrategy {
    pub steps: Vec<PlannedStep>,
}

impl ProcessingStrategy {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn has_parallel_steps(&self) -> bool {
        self.steps.iter().any(|s| s.parallel)
    }

    pub fn total_tier_invocations(&self) -> usize {
        self.steps.iter().map(|s| s.count).sum()
    }
}
