//! The externalization decision function.
//!
//! This is what makes external orchestration unnecessary: an agent can
//! independently assess whether its contribution would be valuable given the
//! current social context. The evaluation weighs self-awareness (what do I
//! know, have I said enough), social awareness (who else is here, should I
//! defer), role appropriateness, and group dynamics.

use crate::context::{DiscussionPhase, EnergyLevel, ParticipantInfo, ParticipantRole, SocialContext};
use crate::intent::{ContributionTiming, ContributionType, ExternalizationDecision};
use crate::stimulus::Stimulus;
use ponder_cognition::{InternalMind, ThoughtType};
use ponder_core::AgentProfile;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct SocialIntelligence {
    agent: Arc<AgentProfile>,
}

impl SocialIntelligence {
    pub fn new(agent: Arc<AgentProfile>) -> Self {
        Self { agent }
    }

    /// Decide whether to externalize given a stimulus and social context.
    ///
    /// Side-effect free: reads the provided mind snapshot and returns a new
    /// decision value. Checks short-circuit in priority order.
    pub fn should_i_speak(
        &self,
        stimulus: &Stimulus,
        context: &SocialContext,
        mind: &InternalMind,
    ) -> ExternalizationDecision {
        let mut factors: HashMap<String, serde_json::Value> = HashMap::new();

        // 1. Am I directly addressed?
        if self.am_i_directly_addressed(stimulus) {
            debug!("agent {} directly addressed, must respond", self.agent.name);
            factors.insert("directly_addressed".into(), json!(true));
            return ExternalizationDecision::must_respond(
                "directly_addressed",
                ContributionType::Response,
                factors,
            );
        }

        // 2. Expertise relevance gate
        let relevance = self.expertise_match(&stimulus.topic);
        factors.insert("expertise_relevance".into(), json!(relevance));

        if relevance < 0.3 {
            debug!(
                "agent {} has low relevance ({relevance:.2}) for topic '{}'",
                self.agent.name, stimulus.topic
            );
            return ExternalizationDecision::passive_awareness(0.9, "not_my_area", factors);
        }

        // 3. Defer to a more qualified participant who hasn't spoken yet
        let defer_to = self.should_defer_to_expert(&stimulus.topic, context, relevance);
        factors.insert("should_defer".into(), json!(defer_to.is_some()));
        if let Some(expert) = defer_to {
            debug!(
                "agent {} deferring to {expert} on topic '{}'",
                self.agent.name, stimulus.topic
            );
            let reason = format!("defer_to_expert:{expert}");
            factors.insert("defer_to".into(), json!(expert));
            return ExternalizationDecision::active_listen(
                0.7,
                reason,
                ContributionTiming::WhenAsked,
                factors,
            );
        }

        // 4. Conversational space
        if !self.is_there_conversational_space(context) {
            factors.insert("conversational_space".into(), json!(false));
            debug!("agent {} waiting for conversational space", self.agent.name);
            return ExternalizationDecision::active_listen(
                0.8,
                "no_space",
                ContributionTiming::WaitForOpening,
                factors,
            );
        }
        factors.insert("conversational_space".into(), json!(true));

        // 5. Have I said enough?
        let said_enough = self.have_i_said_enough(context);
        factors.insert("said_enough".into(), json!(said_enough));

        if said_enough {
            let has_critical = self.have_critical_input(mind);
            factors.insert("has_critical_input".into(), json!(has_critical));
            if !has_critical {
                debug!("agent {} has said enough, listening", self.agent.name);
                return ExternalizationDecision::active_listen(
                    0.6,
                    "said_enough",
                    ContributionTiming::WhenAsked,
                    factors,
                );
            }
        }

        // 6. Role appropriateness
        if context.my_role == ParticipantRole::Observer {
            factors.insert("role_suggests".into(), json!("mostly_listen"));
            debug!("agent {} role suggests listening", self.agent.name);
            return ExternalizationDecision::active_listen(
                0.7,
                "role_is_observer",
                ContributionTiming::WhenAsked,
                factors,
            );
        }

        // 7. Group-size threshold
        let group_type = context.group_type();
        let threshold = group_type.contribution_threshold();
        factors.insert("contribution_threshold".into(), json!(threshold));
        factors.insert("group_type".into(), json!(group_type));

        if relevance < threshold {
            debug!(
                "agent {} below threshold ({relevance:.2} < {threshold:.2}) for group type",
                self.agent.name
            );
            return ExternalizationDecision::may_contribute(
                relevance,
                "below_threshold_for_group_size",
                ContributionTiming::WhenAsked,
                self.contribution_type(context),
                factors,
            );
        }

        // 8. Passed all checks: contribute
        let contribution_type = self.contribution_type(context);
        factors.insert("contribution_type".into(), json!(contribution_type));

        if relevance > 0.6 {
            debug!(
                "agent {} deciding to contribute (should, relevance={relevance:.2})",
                self.agent.name
            );
            ExternalizationDecision::should_contribute(
                relevance,
                "have_valuable_input",
                contribution_type,
                factors,
            )
        } else {
            debug!(
                "agent {} deciding to contribute (may, relevance={relevance:.2})",
                self.agent.name
            );
            ExternalizationDecision::may_contribute(
                relevance,
                "have_valuable_input",
                ContributionTiming::Now,
                contribution_type,
                factors,
            )
        }
    }

    /// Speaking confidence for a topic, straight from expertise relevance.
    pub fn speaking_confidence_for_topic(&self, topic: &str) -> f64 {
        self.expertise_match(topic)
    }

    // ------------------------------------------------------------------
    // Self-awareness
    // ------------------------------------------------------------------

    fn am_i_directly_addressed(&self, stimulus: &Stimulus) -> bool {
        let my_id = self.agent.agent_id.to_string();

        if stimulus.is_directed_at(&my_id, Some(&self.agent.name)) {
            return true;
        }
        stimulus.mentions_agent(&self.agent.name)
    }

    fn expertise_match(&self, topic: &str) -> f64 {
        if topic.is_empty() {
            // Unknown topic = medium relevance
            return 0.5;
        }
        let keywords: Vec<String> = topic.to_lowercase().split_whitespace().map(String::from).collect();
        self.agent.skills.relevance_score(&keywords)
    }

    /// True if my share of contributions exceeds 1.5x my role-adjusted fair
    /// share.
    fn have_i_said_enough(&self, context: &SocialContext) -> bool {
        let my_id = self.agent.agent_id.to_string();
        let total = context.total_contributions();
        if total == 0 {
            return false;
        }

        let my_share = context.contribution_share(&my_id);
        let expected = context.fair_share() * context.my_role.speaking_multiplier();
        my_share > expected * 1.5
    }

    /// Critical input is a high-confidence CONCERN, either ready to share or
    /// held back.
    fn have_critical_input(&self, mind: &InternalMind) -> bool {
        if let Some(best) = mind.get_best_contribution() {
            if best.confidence > 0.8 && best.thought_type == ThoughtType::Concern {
                return true;
            }
        }
        mind.held_insight_thoughts()
            .iter()
            .any(|t| t.confidence > 0.85 && t.thought_type == ThoughtType::Concern)
    }

    // ------------------------------------------------------------------
    // Social awareness
    // ------------------------------------------------------------------

    /// The name of a significantly more qualified participant who hasn't
    /// spoken yet, if any.
    fn should_defer_to_expert(
        &self,
        topic: &str,
        context: &SocialContext,
        my_expertise: f64,
    ) -> Option<String> {
        let my_id = self.agent.agent_id.to_string();
        let keywords: Vec<String> = topic.to_lowercase().split_whitespace().map(String::from).collect();

        for participant in &context.participants {
            if participant.agent_id == my_id {
                continue;
            }
            let their_expertise = estimate_participant_expertise(participant, &keywords);
            if their_expertise > my_expertise + 0.2 && !participant.has_spoken {
                return Some(participant.name.clone());
            }
        }
        None
    }

    fn is_there_conversational_space(&self, context: &SocialContext) -> bool {
        if let Some(speaker) = &context.current_speaker {
            if *speaker != self.agent.agent_id.to_string() {
                return false;
            }
        }

        // Closing phase: only critical input belongs here
        if context.discussion_phase == DiscussionPhase::Closing {
            return false;
        }

        // Heated discussion: only speak if comfortable enough with conflict
        // to calm things rather than inflame them
        if context.energy_level == EnergyLevel::Heated {
            return self.agent.social_markers.comfort_with_conflict >= 6;
        }

        true
    }

    fn contribution_type(&self, context: &SocialContext) -> ContributionType {
        let sm = &self.agent.social_markers;

        if sm.curiosity >= 7 {
            return ContributionType::Question;
        }
        if sm.facilitation_instinct >= 7
            && matches!(
                context.my_role,
                ParticipantRole::Facilitator | ParticipantRole::Leader
            )
        {
            return ContributionType::Facilitation;
        }
        if sm.assertiveness >= 7 && sm.comfort_with_conflict >= 6 {
            return ContributionType::Challenge;
        }
        ContributionType::Statement
    }
}

/// Estimate a participant's expertise on the given keywords from their
/// listed expertise areas. Unknown areas score a moderate 0.5.
fn estimate_participant_expertise(participant: &ParticipantInfo, keywords: &[String]) -> f64 {
    if participant.expertise_areas.is_empty() || keywords.is_empty() {
        return 0.5;
    }

    let expertise_lower: Vec<String> = participant
        .expertise_areas
        .iter()
        .map(|e| e.to_lowercase())
        .collect();

    let matches = keywords
        .iter()
        .filter(|keyword| {
            expertise_lower
                .iter()
                .any(|e| e.contains(*keyword) || keyword.contains(e.as_str()))
        })
        .count();

    (matches as f64 / keywords.len() as f64 + 0.3).min(1.0)
}
