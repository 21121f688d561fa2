//! Tier-specific prompt assembly from agent profiles and context.
//!
//! Each tier gets a different depth of identity and context, sized to the
//! tier's token budget. Identity formatting is deterministic given the
//! profile (see `ponder_core::profile`).

use ponder_core::{tier_config, AgentProfile, CognitiveTier};

const TRUNCATION_SUFFIX: &str = "...[truncated]";

/// Recognized context fields for processing and prompt building.
/// Anything a caller cannot express here is by definition ignored.
#[derive(Clone, Debug, Default)]
pub struct ProcessContext {
    pub recent_turns: Option<String>,
    pub relevant_memory: Option<String>,
    pub prior_thoughts: Option<String>,
    pub patterns: Option<String>,
    pub relationships: Option<String>,
    pub project_history: Option<String>,
    pub stream_topic: Option<String>,
    pub thought_count: Option<usize>,
}

impl ProcessContext {
    pub fn with_prior_thoughts(mut self, formatted: impl Into<String>) -> Self {
        self.prior_thoughts = Some(formatted.into());
        self
    }

    pub fn with_recent_turns(mut self, turns: impl Into<String>) -> Self {
        self.recent_turns = Some(turns.into());
        self
    }

    pub fn with_relevant_memory(mut self, memory: impl Into<String>) -> Self {
        self.relevant_memory = Some(memory.into());
        self
    }
}

/// Supplies memory context for prompts. Memory storage itself is external;
/// the engine only consumes formatted snippets.
pub trait MemoryContextProvider: Send + Sync {
    fn context_for_tier(&self, tier: CognitiveTier, topic: Option<&str>) -> Option<String>;
}

/// Builds plain-text prompts appropriate for each cognitive tier.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(
        &self,
        tier: CognitiveTier,
        agent: &AgentProfile,
        stimulus: &str,
        purpose: &str,
        context: &ProcessContext,
    ) -> String {
        match tier {
            CognitiveTier::Reflex => self.build_reflex(agent, stimulus),
            CognitiveTier::Reactive => self.build_reactive(agent, stimulus, purpose, context),
            CognitiveTier::Deliberate => self.build_deliberate(agent, stimulus, purpose, context),
            CognitiveTier::Analytical => self.build_analytical(agent, stimulus, purpose, context),
            CognitiveTier::Comprehensive => {
                self.build_comprehensive(agent, stimulus, purpose, context)
            }
        }
    }

    /// Minimal prompt: identity line + stimulus. ~100 context tokens.
    fn build_reflex(&self, agent: &AgentProfile, stimulus: &str) -> String {
        format!(
            "{}\n\nSTIMULUS: {}\n\nIMMEDIATE REACTION (one brief thought):",
            agent.identity_minimal(),
            stimulus
        )
    }

    /// Quick but more considered than REFLEX. ~300 context tokens.
    fn build_reactive(
        &self,
        agent: &AgentProfile,
        stimulus: &str,
        purpose: &str,
        context: &ProcessContext,
    ) -> String {
        let budget = context_char_budget(CognitiveTier::Reactive);

        let recent = match &context.recent_turns {
            Some(turns) => format!("\nRECENT CONTEXT:\n{}", truncate(turns, budget)),
            None => String::new(),
        };

        format!(
            "{}{}\n\nSITUATION: {}\n\nPURPOSE: {}\n\nYour quick assessment (2-3 sentences):",
            agent.identity_brief(),
            recent,
            stimulus,
            purpose
        )
    }

    /// Full identity, social style, memory. ~600 context tokens.
    fn build_deliberate(
        &self,
        agent: &AgentProfile,
        stimulus: &str,
        purpose: &str,
        context: &ProcessContext,
    ) -> String {
        let budget = context_char_budget(CognitiveTier::Deliberate);

        let memory = match &context.relevant_memory {
            Some(memory) => format!("\nRELEVANT MEMORY:\n{}", truncate(memory, budget)),
            None => String::new(),
        };
        let prior = match &context.prior_thoughts {
            Some(prior) => format!("\nYOUR THINKING SO FAR:\n{}", truncate(prior, budget)),
            None => String::new(),
        };

        format!(
            "{}\n\nYOUR SOCIAL STYLE:\n{}\n{}{}\n\nSITUATION:\n{}\n\nPURPOSE: {}\n\nProvide your considered thoughts:",
            agent.identity_full(),
            agent.social_style_summary(),
            memory,
            prior,
            stimulus,
            purpose
        )
    }

    /// Deep analysis with a structured question framework. ~1000 context tokens.
    fn build_analytical(
        &self,
        agent: &AgentProfile,
        stimulus: &str,
        purpose: &str,
        context: &ProcessContext,
    ) -> String {
        let budget = context_char_budget(CognitiveTier::Analytical);
        let mut sections = vec![agent.identity_full()];

        push_section(&mut sections, "RELEVANT EXPERIENCE", &context.relevant_memory, budget);
        push_section(&mut sections, "PATTERNS YOU'VE LEARNED", &context.patterns, budget);
        push_section(&mut sections, "RELATIONSHIP CONTEXT", &context.relationships, budget);
        push_section(&mut sections, "YOUR THINKING PROCESS", &context.prior_thoughts, budget);

        sections.push(format!("SITUATION:\n{stimulus}"));
        sections.push(format!("PURPOSE: {purpose}"));
        sections.push(
            "Provide thorough analysis:\n\
             1. What's really going on here?\n\
             2. What do I know that's relevant?\n\
             3. What patterns apply?\n\
             4. What are the risks/opportunities?\n\
             5. What's my considered position?"
                .to_string(),
        );

        sections.join("\n\n")
    }

    /// Maximum depth, including personality. ~1500 context tokens.
    fn build_comprehensive(
        &self,
        agent: &AgentProfile,
        stimulus: &str,
        purpose: &str,
        context: &ProcessContext,
    ) -> String {
        let budget = context_char_budget(CognitiveTier::Comprehensive);
        let mut sections = vec![agent.identity_full()];

        sections.push(format!("YOUR SOCIAL STYLE:\n{}", agent.social_style_summary()));
        sections.push(format!("YOUR THINKING STYLE:\n{}", agent.thinking_style_summary()));

        push_section(&mut sections, "RELEVANT EXPERIENCE", &context.relevant_memory, budget);
        push_section(&mut sections, "PATTERNS YOU'VE LEARNED", &context.patterns, budget);
        push_section(&mut sections, "RELATIONSHIP CONTEXT", &context.relationships, budget);
        push_section(&mut sections, "YOUR THINKING PROCESS", &context.prior_thoughts, budget);
        push_section(&mut sections, "PROJECT HISTORY", &context.project_history, budget);

        sections.push(format!("SITUATION:\n{stimulus}"));
        sections.push(format!("PURPOSE: {purpose}"));
        sections.push(
            "Provide comprehensive analysis:\n\
             1. What's really going on here? Consider multiple perspectives.\n\
             2. What do I know that's relevant? Draw from all my experience.\n\
             3. What patterns apply? Think about similar situations I've encountered.\n\
             4. What are the risks and opportunities? Be thorough.\n\
             5. Who else should be involved and why?\n\
             6. What's my considered position? Support with reasoning.\n\
             7. What would I recommend as next steps?"
                .to_string(),
        );

        sections.join("\n\n")
    }

    /// Bullet-format the last `max_count` prior thoughts for context.
    pub fn format_prior_thoughts(thoughts: &[String], max_count: usize) -> String {
        let skip = thoughts.len().saturating_sub(max_count);
        thoughts[skip..]
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Character budget for one context block: tokens x 4 chars heuristic.
fn context_char_budget(tier: CognitiveTier) -> usize {
    tier_config(tier).max_context_tokens as usize * 4
}

fn push_section(sections: &mut Vec<String>, header: &str, content: &Option<String>, budget: usize) {
    if let Some(content) = content {
        sections.push(format!("{header}:\n{}", truncate(content, budget)));
    }
}

/// Truncate on a char boundary with a marker suffix.
pub fn truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let keep = max_chars.saturating_sub(TRUNCATION_SUFFIX.len());
    let truncated: String = content.chars().take(keep).collect();
    format!("{truncated}{TRUNCATION_SUFFIX}")
}
