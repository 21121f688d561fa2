//! Tests for ponder-social: stimuli, social context, and the
//! externalization decision pipeline

use ponder_cognition::{InternalMind, Thought, ThoughtType};
use ponder_core::{AgentProfile, CognitiveTier, SocialMarkers};
use ponder_social::*;
use std::sync::Arc;

fn engineer(python_level: u8) -> Arc<AgentProfile> {
    Arc::new(
        AgentProfile::new("Mara", "backend engineer")
            .with_backstory("Ten years of backend work.")
            .with_technical_skill("python", python_level)
            .with_technical_skill("databases", 7),
    )
}

fn decide(
    agent: &Arc<AgentProfile>,
    stimulus: &Stimulus,
    context: &SocialContext,
) -> ExternalizationDecision {
    let mind = InternalMind::new(agent.agent_id.to_string());
    SocialIntelligence::new(agent.clone()).should_i_speak(stimulus, context, &mind)
}

// ===========================================================================
// GroupType
// ===========================================================================

#[test]
fn group_type_boundaries() {
    assert_eq!(GroupType::classify(1), GroupType::Solo);
    assert_eq!(GroupType::classify(2), GroupType::Pair);
    assert_eq!(GroupType::classify(3), GroupType::SmallTeam);
    assert_eq!(GroupType::classify(6), GroupType::SmallTeam);
    assert_eq!(GroupType::classify(7), GroupType::Meeting);
    assert_eq!(GroupType::classify(20), GroupType::Meeting);
    assert_eq!(GroupType::classify(21), GroupType::LargeGroup);
    assert_eq!(GroupType::classify(100), GroupType::LargeGroup);
    assert_eq!(GroupType::classify(101), GroupType::Army);
}

#[test]
fn contribution_thresholds_grow_with_group_size() {
    assert_eq!(GroupType::Solo.contribution_threshold(), 0.0);
    assert_eq!(GroupType::Pair.contribution_threshold(), 0.3);
    assert_eq!(GroupType::SmallTeam.contribution_threshold(), 0.4);
    assert_eq!(GroupType::Meeting.contribution_threshold(), 0.5);
    assert_eq!(GroupType::LargeGroup.contribution_threshold(), 0.7);
    assert_eq!(GroupType::Army.contribution_threshold(), 0.9);
}

// ===========================================================================
// Stimulus
// ===========================================================================

#[test]
fn stimulus_broadcast_vs_directed() {
    let broadcast = Stimulus::new("anyone have thoughts?");
    assert!(broadcast.is_broadcast());
    assert!(!broadcast.is_directed());

    let directed = Stimulus::direct_question("what do you think?", vec!["a-1".into()], "deploys");
    assert!(directed.is_directed());
    assert!(directed.requires_response);
    assert!(directed.is_directed_at("a-1", None));
    assert!(!directed.is_directed_at("a-2", None));
}

#[test]
fn stimulus_directed_at_matches_name_case_insensitively() {
    let directed = Stimulus::direct_question("q", vec!["Mara".into()], "topic");
    assert!(directed.is_directed_at("some-uuid", Some("mara")));
}

#[test]
fn stimulus_mentions_by_name_or_handle() {
    let s = Stimulus::new("I think @mara should weigh in");
    assert!(s.mentions_agent("Mara"));
    assert!(!s.mentions_agent("Jon"));
}

#[test]
fn keyword_extraction_filters_stop_words() {
    let s = Stimulus::new("The database migration should be rolled back!");
    let keywords = s.extract_keywords();
    assert!(keywords.contains(&"database".to_string()));
    assert!(keywords.contains(&"migration".to_string()));
    assert!(!keywords.contains(&"the".to_string()));
    assert!(!keywords.contains(&"should".to_string()));
    // Punctuation stripped
    assert!(keywords.contains(&"back".to_string()));
}

#[test]
fn from_message_auto_extracts_topic() {
    let s = Stimulus::from_message("Kafka consumer lag is growing fast", None);
    assert!(s.topic.contains("kafka"));
    assert!(s.topic.contains("consumer"));

    let s = Stimulus::from_message("whatever text", Some("deploy pipeline"));
    assert_eq!(s.topic, "deploy pipeline");
}

// ===========================================================================
// SocialContext
// ===========================================================================

#[test]
fn update_speaker_is_the_single_source_of_truth() {
    let mut context = SocialContext::new(3);
    context.participants = vec![ParticipantInfo::new("p1", "Jon")];

    context.update_speaker("p1");
    context.update_speaker("p1");
    context.update_speaker("p2");

    assert_eq!(context.current_speaker.as_deref(), Some("p2"));
    assert_eq!(context.speaking_distribution["p1"], 2);
    assert_eq!(context.speaking_distribution["p2"], 1);
    assert_eq!(context.total_contributions(), 3);

    let jon = context.get_participant("p1").unwrap();
    assert!(jon.has_spoken);
    assert_eq!(jon.contribution_count, 2);
}

#[test]
fn shares_and_fair_share() {
    let mut context = SocialContext::new(4);
    context.update_speaker("me");
    context.update_speaker("me");
    context.update_speaker("them");
    context.current_speaker = None;

    assert!((context.contribution_share("me") - 2.0 / 3.0).abs() < 1e-9);
    assert!((context.fair_share() - 0.25).abs() < 1e-9);
    assert_eq!(context.contribution_share("unknown"), 0.0);
}

#[test]
fn expertise_lookup_uses_substring_overlap() {
    let mut context = SocialContext::new(3);
    context
        .expertise_present
        .insert("machine_learning".into(), vec!["p1".into()]);

    assert_eq!(context.participants_with_expertise("machine"), vec!["p1"]);
    assert!(context.participants_with_expertise("frontend").is_empty());
    assert!(context.has_expert_for("machine learning models"));
}

// ===========================================================================
// Decision pipeline
// ===========================================================================

#[test]
fn s6_direct_address_outranks_low_relevance() {
    let agent = engineer(0);
    let stimulus = Stimulus::direct_question(
        "thoughts on the campaign?",
        vec![agent.agent_id.to_string()],
        "marketing",
    );
    let context = SocialContext::new(5);

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::MustRespond);
    assert_eq!(decision.confidence, 1.0);
    assert_eq!(decision.contribution_type, Some(ContributionType::Response));
    assert!(!decision.should_wait());
}

#[test]
fn name_mention_in_content_counts_as_address() {
    let agent = engineer(5);
    let stimulus = Stimulus::new("maybe Mara knows about this").with_topic("marketing");
    let context = SocialContext::new(5);

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::MustRespond);
}

#[test]
fn low_relevance_is_passive_awareness() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("what color for the landing page?").with_topic("marketing design");
    let context = SocialContext::new(5);

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::PassiveAwareness);
    assert_eq!(decision.confidence, 0.9);
    assert_eq!(decision.reason, "not_my_area");
}

#[test]
fn s7_defer_to_silent_expert() {
    let agent = engineer(6);
    let stimulus = Stimulus::new("how should we structure this?").with_topic("python");

    let mut context = SocialContext::new(3);
    context.participants = vec![
        ParticipantInfo::new("p9", "Greta").with_expertise(vec!["python".into()]),
    ];

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ActiveListen);
    assert!(decision.reason.starts_with("defer_to_expert:"));
    assert!(decision.reason.contains("Greta"));
}

#[test]
fn no_deferral_once_the_expert_has_spoken() {
    let agent = engineer(6);
    let stimulus = Stimulus::new("how should we structure this?").with_topic("python");

    let mut context = SocialContext::new(3);
    let mut expert = ParticipantInfo::new("p9", "Greta").with_expertise(vec!["python".into()]);
    expert.has_spoken = true;
    context.participants = vec![expert];

    let decision = decide(&agent, &stimulus, &context);
    assert_ne!(decision.intent, ExternalizationIntent::ActiveListen);
}

#[test]
fn current_speaker_blocks_the_floor() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("let's dig into this").with_topic("python");
    let mut context = SocialContext::new(3);
    context.current_speaker = Some("someone-else".into());

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ActiveListen);
    assert_eq!(decision.reason, "no_space");
    assert_eq!(decision.timing, ContributionTiming::WaitForOpening);
}

#[test]
fn closing_phase_blocks_the_floor() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("one more idea").with_topic("python");
    let mut context = SocialContext::new(3);
    context.discussion_phase = DiscussionPhase::Closing;

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ActiveListen);
}

#[test]
fn heated_discussion_needs_conflict_comfort() {
    let stimulus = Stimulus::new("strong opinions flying").with_topic("python");
    let mut context = SocialContext::new(3);
    context.energy_level = EnergyLevel::Heated;

    let timid = Arc::new(
        AgentProfile::new("Mara", "backend engineer")
            .with_technical_skill("python", 9)
            .with_social_markers(SocialMarkers {
                comfort_with_conflict: 3,
                ..SocialMarkers::default()
            }),
    );
    let decision = decide(&timid, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ActiveListen);

    let steady = Arc::new(
        AgentProfile::new("Mara", "backend engineer")
            .with_technical_skill("python", 9)
            .with_social_markers(SocialMarkers {
                comfort_with_conflict: 8,
                ..SocialMarkers::default()
            }),
    );
    let decision = decide(&steady, &stimulus, &context);
    assert!(decision.should_speak());
}

#[test]
fn said_enough_yields_the_floor() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("continuing the thread").with_topic("python");

    let mut context = SocialContext::new(4);
    let my_id = agent.agent_id.to_string();
    for _ in 0..8 {
        context.update_speaker(&my_id);
    }
    context.update_speaker("p2");
    context.update_speaker("p3");
    context.current_speaker = None;

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ActiveListen);
    assert_eq!(decision.reason, "said_enough");
}

#[test]
fn critical_concern_overrides_said_enough() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("continuing the thread").with_topic("python");

    let mut context = SocialContext::new(4);
    let my_id = agent.agent_id.to_string();
    for _ in 0..8 {
        context.update_speaker(&my_id);
    }
    context.update_speaker("p2");
    context.current_speaker = None;

    let mut mind = InternalMind::new(my_id);
    let concern = Thought::new(
        CognitiveTier::Deliberate,
        "this python upgrade will corrupt the serialized caches",
        ThoughtType::Concern,
        "analysis",
    )
    .with_quality(0.9, 0.8);
    mind.prepare_to_share(concern);

    let decision = SocialIntelligence::new(agent.clone()).should_i_speak(&stimulus, &context, &mind);
    assert_ne!(decision.intent, ExternalizationIntent::ActiveListen);
    assert!(decision.should_speak());
}

#[test]
fn observer_role_listens() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("what do we think?").with_topic("python");
    let mut context = SocialContext::new(3);
    context.my_role = ParticipantRole::Observer;

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ActiveListen);
    assert_eq!(decision.reason, "role_is_observer");
}

#[test]
fn large_group_raises_the_bar() {
    let agent = engineer(6); // relevance 0.6 on "python"
    let stimulus = Stimulus::new("scaling question").with_topic("python");
    let context = SocialContext::new(30); // threshold 0.7

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::MayContribute);
    assert_eq!(decision.reason, "below_threshold_for_group_size");
    assert_eq!(decision.timing, ContributionTiming::WhenAsked);
}

#[test]
fn strong_relevance_in_small_team_should_contribute() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("how do we fix the worker pool?").with_topic("python");
    let context = SocialContext::new(3);

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::ShouldContribute);
    assert!((decision.confidence - 0.9).abs() < 1e-9);
    assert_eq!(decision.reason, "have_valuable_input");
    assert!(decision.factors.contains_key("expertise_relevance"));
}

#[test]
fn moderate_relevance_may_contribute_now() {
    let agent = engineer(5); // relevance 0.5: above SmallTeam threshold, below 0.6
    let stimulus = Stimulus::new("thoughts?").with_topic("python");
    let context = SocialContext::new(3);

    let decision = decide(&agent, &stimulus, &context);
    assert_eq!(decision.intent, ExternalizationIntent::MayContribute);
    assert_eq!(decision.timing, ContributionTiming::Now);
}

#[test]
fn contribution_type_follows_social_markers() {
    let stimulus = Stimulus::new("planning the refactor").with_topic("python");
    let context = SocialContext::new(3);

    let curious = Arc::new(
        AgentProfile::new("Q", "engineer")
            .with_technical_skill("python", 9)
            .with_social_markers(SocialMarkers {
                curiosity: 8,
                ..SocialMarkers::default()
            }),
    );
    assert_eq!(
        decide(&curious, &stimulus, &context).contribution_type,
        Some(ContributionType::Question)
    );

    let challenger = Arc::new(
        AgentProfile::new("C", "engineer")
            .with_technical_skill("python", 9)
            .with_social_markers(SocialMarkers {
                assertiveness: 8,
                comfort_with_conflict: 7,
                ..SocialMarkers::default()
            }),
    );
    assert_eq!(
        decide(&challenger, &stimulus, &context).contribution_type,
        Some(ContributionType::Challenge)
    );

    let facilitator = Arc::new(
        AgentProfile::new("F", "engineer")
            .with_technical_skill("python", 9)
            .with_social_markers(SocialMarkers {
                facilitation_instinct: 8,
                ..SocialMarkers::default()
            }),
    );
    let mut facilitated = SocialContext::new(3);
    facilitated.my_role = ParticipantRole::Facilitator;
    assert_eq!(
        decide(&facilitator, &stimulus, &facilitated).contribution_type,
        Some(ContributionType::Facilitation)
    );

    let plain = engineer(9);
    assert_eq!(
        decide(&plain, &stimulus, &context).contribution_type,
        Some(ContributionType::Statement)
    );
}

#[test]
fn empty_topic_is_medium_relevance() {
    let agent = engineer(9);
    let social = SocialIntelligence::new(agent);
    assert_eq!(social.speaking_confidence_for_topic(""), 0.5);
    assert!((social.speaking_confidence_for_topic("python") - 0.9).abs() < 1e-9);
}

#[test]
fn decision_factors_capture_the_path() {
    let agent = engineer(9);
    let stimulus = Stimulus::new("worker pool question").with_topic("python");
    let context = SocialContext::new(3);

    let decision = decide(&agent, &stimulus, &context);
    assert!(decision.factors.contains_key("expertise_relevance"));
    assert!(decision.factors.contains_key("conversational_space"));
    assert!(decision.factors.contains_key("contribution_type"));
}
