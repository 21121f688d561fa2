//! The core processing engine: plans a strategy for each stimulus and
//! executes cognitive tiers against the model router, producing thoughts.

use crate::prompts::{MemoryContextProvider, ProcessContext, PromptBuilder};
use crate::thought::{CognitiveResult, PlannedStep, ProcessingStrategy, Thought, ThoughtType};
use ponder_core::{tier_config, AgentProfile, CognitiveTier, Error, Result};
use ponder_llm::{InferenceRequest, InferenceResponse, ModelRouter};
use std::collections::BTreeSet;
use std::time::Instant;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

const HEDGING_WORDS: [&str; 5] = ["maybe", "perhaps", "might", "possibly", "uncertain"];

/// Processes stimuli through cognitive tiers.
///
/// Cheap to clone: all state is behind `Arc`s, so parallel tier runs can
/// carry their own handle.
#[derive(Clone)]
pub struct CognitiveProcessor {
    agent: Arc<AgentProfile>,
    router: Arc<ModelRouter>,
    prompts: PromptBuilder,
    memory: Option<Arc<dyn MemoryContextProvider>>,
}

impl CognitiveProcessor {
    pub fn new(agent: Arc<AgentProfile>, router: Arc<ModelRouter>) -> Self {
        Self {
            agent,
            router,
            prompts: PromptBuilder,
            memory: None,
        }
    }

    pub fn with_memory_provider(mut self, provider: Arc<dyn MemoryContextProvider>) -> Self {
        self.memory = Some(provider);
        self
    }

    pub fn agent(&self) -> &AgentProfile {
        &self.agent
    }

    pub fn router(&self) -> &Arc<ModelRouter> {
        &self.router
    }

    /// Process a stimulus with appropriate cognitive depth.
    ///
    /// Individual tier failures are logged and their thoughts omitted; the
    /// call itself only fails on invalid input.
    pub async fn process(
        &self,
        stimulus: &str,
        urgency: f64,
        complexity: f64,
        relevance: f64,
        purpose: &str,
        context: Option<&ProcessContext>,
    ) -> Result<CognitiveResult> {
        if stimulus.trim().is_empty() {
            return Err(Error::validation("stimulus must not be empty"));
        }
        for (name, value) in [
            ("urgency", urgency),
            ("complexity", complexity),
            ("relevance", relevance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::validation(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        let start = Instant::now();
        let stimulus_id = Uuid::new_v4();

        let strategy = plan_strategy(urgency, complexity, relevance);
        debug!(
            "planned strategy with {} steps for urgency={:.2}, complexity={:.2}, relevance={:.2}",
            strategy.step_count(),
            urgency,
            complexity,
            relevance
        );
        let _ = purpose; // the plan's own step purposes drive each tier run

        let mut thoughts: Vec<Thought> = Vec::new();

        for step in &strategy.steps {
            if step.parallel && step.count > 1 {
                self.run_parallel_step(step, stimulus, context, &mut thoughts)
                    .await;
            } else {
                match self
                    .run_tier(step.tier, stimulus, step.purpose, context, &thoughts)
                    .await
                {
                    Ok(thought) => thoughts.push(thought),
                    Err(e) => error!("sequential tier execution failed: {e}"),
                }
            }
        }

        let primary = select_primary_thought(&thoughts);
        let tiers_used: Vec<CognitiveTier> = thoughts
            .iter()
            .map(|t| t.tier)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(CognitiveResult {
            primary_thought: primary.cloned(),
            thoughts,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            tiers_used,
            agent_id: Some(self.agent.agent_id),
            stimulus_id: Some(stimulus_id),
        })
    }

    /// Process with a specific tier, bypassing strategy planning.
    pub async fn process_with_tier_override(
        &self,
        stimulus: &str,
        tier: CognitiveTier,
        purpose: &str,
        context: Option<&ProcessContext>,
    ) -> Result<Thought> {
        if stimulus.trim().is_empty() {
            return Err(Error::validation("stimulus must not be empty"));
        }
        self.run_tier(tier, stimulus, purpose, context, &[]).await
    }

    async fn run_parallel_step(
        &self,
        step: &PlannedStep,
        stimulus: &str,
        context: Option<&ProcessContext>,
        thoughts: &mut Vec<Thought>,
    ) {
        let prior: Vec<Thought> = thoughts.clone();
        let handles: Vec<_> = (0..step.count)
            .map(|i| {
                let processor = self.clone();
                let tier = step.tier;
                let purpose = format!("{}_{}", step.purpose, i);
                let stimulus = stimulus.to_string();
                let context = context.cloned();
                let prior = prior.clone();
                tokio::spawn(async move {
                    processor
                        .run_tier(tier, &stimulus, &purpose, context.as_ref(), &prior)
                        .await
                })
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            match handle {
                Ok(Ok(thought)) => thoughts.push(thought),
                Ok(Err(e)) => error!("parallel tier execution failed: {e}"),
                Err(e) => error!("parallel tier task panicked: {e}"),
            }
        }
    }

    async fn run_tier(
        &self,
        tier: CognitiveTier,
        stimulus: &str,
        purpose: &str,
        context: Option<&ProcessContext>,
        prior_thoughts: &[Thought],
    ) -> Result<Thought> {
        let mut effective = context.cloned().unwrap_or_default();

        if !prior_thoughts.is_empty() {
            let contents: Vec<String> =
                prior_thoughts.iter().map(|t| t.content.clone()).collect();
            effective.prior_thoughts = Some(PromptBuilder::format_prior_thoughts(&contents, 3));
        }

        if effective.relevant_memory.is_none() {
            if let Some(memory) = &self.memory {
                effective.relevant_memory =
                    memory.context_for_tier(tier, effective.stream_topic.as_deref());
            }
        }

        let prompt = self
            .prompts
            .build(tier, &self.agent, stimulus, purpose, &effective);

        let config = tier_config(tier);
        let request = InferenceRequest::new(prompt, config.max_tokens);

        let response = self
            .router
            .route(tier, request, &self.agent.agent_id.to_string())
            .await?;

        let content = response.text.trim().to_string();
        if content.is_empty() {
            return Err(Error::validation("model returned empty text"));
        }

        let skip = prior_thoughts.len().saturating_sub(2);
        let related: Vec<Uuid> = prior_thoughts[skip..].iter().map(|t| t.id).collect();

        let mut thought = Thought::new(
            tier,
            content,
            infer_thought_type(purpose, &response.text),
            purpose,
        )
        .with_quality(
            estimate_confidence(tier, &response),
            estimate_completeness(tier, &response),
        );
        thought.related_thought_ids = related;
        Ok(thought)
    }
}

/// Plan the processing strategy from stimulus characteristics.
///
/// - High urgency + relevant: REFLEX first, then parallel REACTIVE
/// - Low urgency + relevant: go straight to DELIBERATE
/// - Low relevance: just note it with REFLEX
/// - Medium everything: proportional single step
pub fn plan_strategy(urgency: f64, complexity: f64, relevance: f64) -> ProcessingStrategy {
    let mut steps = Vec::new();

    if urgency > 0.8 && relevance > 0.5 {
        steps.push(PlannedStep::sequential(
            CognitiveTier::Reflex,
            "immediate_response",
        ));
        // Tactical + strategic perspectives
        steps.push(PlannedStep::parallel(
            CognitiveTier::Reactive,
            "tactical_assessment",
            2,
        ));
        if complexity > 0.5 {
            steps.push(PlannedStep::sequential(
                CognitiveTier::Deliberate,
                "deeper_analysis",
            ));
        }
    } else if urgency < 0.3 && relevance > 0.5 {
        steps.push(PlannedStep::sequential(
            CognitiveTier::Deliberate,
            "considered_response",
        ));
        if complexity > 0.7 {
            steps.push(PlannedStep::sequential(
                CognitiveTier::Analytical,
                "thorough_analysis",
            ));
        }
    } else if relevance < 0.3 {
        steps.push(PlannedStep::sequential(
            CognitiveTier::Reflex,
            "note_for_context",
        ));
    } else {
        let tier = if complexity < 0.5 {
            CognitiveTier::Reactive
        } else {
            CognitiveTier::Deliberate
        };
        steps.push(PlannedStep::sequential(tier, "proportional_response"));
    }

    ProcessingStrategy { steps }
}

/// Pick the most significant thought: 40% tier level, 30% confidence,
/// 30% completeness. First of equals wins, so selection is deterministic.
pub fn select_primary_thought(thoughts: &[Thought]) -> Option<&Thought> {
    let score =
        |t: &Thought| f64::from(t.tier.level()) * 0.4 + t.confidence * 0.3 + t.completeness * 0.3;

    let mut best: Option<(&Thought, f64)> = None;
    for thought in thoughts {
        let s = score(thought);
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((thought, s)),
        }
    }
    best.map(|(t, _)| t)
}

/// Infer the thought type from purpose and content keywords.
pub fn infer_thought_type(purpose: &str, content: &str) -> ThoughtType {
    let lower = content.to_lowercase();

    if ["concern", "risk", "worry", "careful", "danger"]
        .iter()
        .any(|w| lower.contains(w))
    {
        return ThoughtType::Concern;
    }
    if content.contains('?') {
        return ThoughtType::Question;
    }
    if purpose == "immediate_response" {
        return ThoughtType::Reaction;
    }
    if ["should", "could", "plan", "next", "recommend"]
        .iter()
        .any(|w| lower.contains(w))
    {
        return ThoughtType::Plan;
    }
    if ["notice", "observe", "see", "note"]
        .iter()
        .any(|w| lower.contains(w))
    {
        return ThoughtType::Observation;
    }

    ThoughtType::Insight
}

/// Base confidence by tier, reduced slightly for hedging language.
pub fn estimate_confidence(tier: CognitiveTier, response: &InferenceResponse) -> f64 {
    let base = match tier {
        CognitiveTier::Reflex => 0.5,
        CognitiveTier::Reactive => 0.6,
        CognitiveTier::Deliberate => 0.75,
        CognitiveTier::Analytical => 0.85,
        CognitiveTier::Comprehensive => 0.9,
    };

    let lower = response.text.to_lowercase();
    let hedging_count = HEDGING_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let penalty = (hedging_count as f64 * 0.05).min(0.15);

    (base - penalty).max(0.3)
}

/// Completeness from token utilization relative to the tier budget.
/// Low utilization is either truncated or concise; hard to tell apart.
pub fn estimate_completeness(tier: CognitiveTier, response: &InferenceResponse) -> f64 {
    let max_tokens = tier_config(tier).max_tokens;
    if max_tokens == 0 {
        return 0.5;
    }
    let utilization = f64::from(response.completion_tokens) / f64::from(max_tokens);

    if utilization > 0.8 {
        0.9
    } else if utilization > 0.5 {
        0.7
    } else if utilization > 0.2 {
        0.5
    } else {
        0.4
    }
}
