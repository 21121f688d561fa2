//! Tests for ponder-core: tier catalog, errors, and agent profiles

use ponder_core::*;

// ===========================================================================
// CognitiveTier & catalog
// ===========================================================================

#[test]
fn tiers_are_ordered_by_depth() {
    assert!(CognitiveTier::Reflex < CognitiveTier::Reactive);
    assert!(CognitiveTier::Reactive < CognitiveTier::Deliberate);
    assert!(CognitiveTier::Deliberate < CognitiveTier::Analytical);
    assert!(CognitiveTier::Analytical < CognitiveTier::Comprehensive);
    assert_eq!(CognitiveTier::Reflex.level(), 0);
    assert_eq!(CognitiveTier::Comprehensive.level(), 4);
}

#[test]
fn tier_catalog_token_budgets() {
    assert_eq!(tier_config(CognitiveTier::Reflex).max_tokens, 150);
    assert_eq!(tier_config(CognitiveTier::Reactive).max_tokens, 400);
    assert_eq!(tier_config(CognitiveTier::Deliberate).max_tokens, 1200);
    assert_eq!(tier_config(CognitiveTier::Analytical).max_tokens, 2500);
    assert_eq!(tier_config(CognitiveTier::Comprehensive).max_tokens, 4000);
}

#[test]
fn tier_catalog_timeouts_floor_at_1_5x_latency() {
    for tier in CognitiveTier::ALL {
        let config = tier_config(tier);
        assert!(
            config.timeout_ms as f64 >= config.target_latency_ms as f64 * 1.5,
            "{tier} timeout below 1.5x target latency"
        );
    }
    assert_eq!(tier_config(CognitiveTier::Reflex).timeout_ms, 500);
    assert_eq!(tier_config(CognitiveTier::Reactive).timeout_ms, 1000);
    assert_eq!(tier_config(CognitiveTier::Deliberate).timeout_ms, 3000);
    assert_eq!(tier_config(CognitiveTier::Analytical).timeout_ms, 7000);
    assert_eq!(tier_config(CognitiveTier::Comprehensive).timeout_ms, 12000);
}

#[test]
fn only_shallow_tiers_run_parallel() {
    assert!(tier_config(CognitiveTier::Reflex).runs_parallel);
    assert!(tier_config(CognitiveTier::Reactive).runs_parallel);
    assert!(!tier_config(CognitiveTier::Deliberate).runs_parallel);
    assert!(!tier_config(CognitiveTier::Analytical).runs_parallel);
    assert!(!tier_config(CognitiveTier::Comprehensive).runs_parallel);
}

#[test]
fn tier_serde_round_trip() {
    let json = serde_json::to_string(&CognitiveTier::Deliberate).unwrap();
    assert_eq!(json, r#""deliberate""#);
    let back: CognitiveTier = serde_json::from_str(&json).unwrap();
    assert_eq!(back, CognitiveTier::Deliberate);
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn error_display_includes_tier() {
    let e = Error::model_timeout("large", 3000);
    assert!(e.to_string().contains("large"));
    assert!(e.to_string().contains("3000"));

    let e = Error::model_error("medium", "connection refused");
    assert!(e.to_string().contains("medium"));
    assert!(e.to_string().contains("connection refused"));
}

#[test]
fn inference_failures_are_classified() {
    assert!(Error::model_timeout("large", 1).is_inference_failure());
    assert!(Error::model_error("small", "x").is_inference_failure());
    assert!(Error::NoModelAvailable("x".into()).is_inference_failure());
    assert!(!Error::validation("bad input").is_inference_failure());
    assert!(!Error::Config("bad toml".into()).is_inference_failure());
}

// ===========================================================================
// SkillSet
// ===========================================================================

fn sample_profile() -> AgentProfile {
    AgentProfile::new("Ada", "staff engineer")
        .with_backstory("Fifteen years of distributed systems work.")
        .with_technical_skill("python", 9)
        .with_technical_skill("rust", 7)
        .with_technical_skill("kubernetes", 5)
        .with_domain_skill("data_engineering", 8)
        .with_years_experience(15)
}

#[test]
fn top_skills_sorted_by_level() {
    let profile = sample_profile();
    let top = profile.skills.top_skills(3);
    assert_eq!(top.len(), 3);
    assert_eq!(top[0], ("python".to_string(), 9));
    assert_eq!(top[1], ("data_engineering".to_string(), 8));
    assert_eq!(top[2], ("rust".to_string(), 7));
}

#[test]
fn relevance_score_matches_substring_both_ways() {
    let profile = sample_profile();

    // Exact skill name
    let score = profile.skills.relevance_score(&["python".to_string()]);
    assert!((score - 0.9).abs() < 1e-9);

    // Keyword contained in skill name
    let score = profile.skills.relevance_score(&["data".to_string()]);
    assert!((score - 0.8).abs() < 1e-9);

    // No match
    let score = profile.skills.relevance_score(&["marketing".to_string()]);
    assert_eq!(score, 0.0);

    // Empty keywords
    assert_eq!(profile.skills.relevance_score(&[]), 0.0);
}

#[test]
fn relevance_score_averages_over_all_keywords() {
    let profile = sample_profile();
    // One keyword matches at 9, one matches nothing: 9 / (2 * 10)
    let score = profile
        .skills
        .relevance_score(&["python".to_string(), "marketing".to_string()]);
    assert!((score - 0.45).abs() < 1e-9);
}

// ===========================================================================
// Identity formatting
// ===========================================================================

#[test]
fn identity_minimal_is_one_line() {
    let profile = sample_profile();
    assert_eq!(profile.identity_minimal(), "You are Ada, a staff engineer.");
}

#[test]
fn identity_brief_includes_top_skills_and_experience() {
    let profile = sample_profile();
    let brief = profile.identity_brief();
    assert!(brief.contains("You are Ada, a staff engineer."));
    assert!(brief.contains("python"));
    assert!(brief.contains("data engineering")); // underscores replaced
    assert!(brief.contains("Experience: 15 years."));
}

#[test]
fn identity_full_has_sections() {
    let profile = sample_profile();
    let full = profile.identity_full();
    assert!(full.contains("IDENTITY:"));
    assert!(full.contains("SKILLS & EXPERTISE:"));
    assert!(full.contains("COMMUNICATION STYLE:"));
    assert!(full.contains("- python: 9/10"));
    assert!(full.contains("Fifteen years of distributed systems work."));
}

#[test]
fn identity_formatting_is_deterministic() {
    let profile = sample_profile();
    assert_eq!(profile.identity_full(), profile.identity_full());
    assert_eq!(profile.identity_brief(), profile.identity_brief());
}

#[test]
fn social_style_reflects_markers() {
    let mut profile = sample_profile();
    profile.social_markers.confidence = 8;
    profile.social_markers.curiosity = 8;
    let summary = profile.social_style_summary();
    assert!(summary.contains("confidently"));
    assert!(summary.contains("probing questions"));

    // All-balanced markers produce the fallback line
    let balanced = AgentProfile::new("Bo", "analyst");
    assert_eq!(
        balanced.social_style_summary(),
        "You have a balanced social style."
    );
}

#[test]
fn thinking_style_reflects_markers() {
    let mut profile = sample_profile();
    profile.personality_markers.conscientiousness = 9;
    profile.personality_markers.risk_tolerance = 2;
    let summary = profile.thinking_style_summary();
    assert!(summary.contains("detail-oriented"));
    assert!(summary.contains("well-tested"));
}

#[test]
fn profile_serde_round_trip() {
    let profile = sample_profile();
    let json = serde_json::to_string(&profile).unwrap();
    let back: AgentProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name, "Ada");
    assert_eq!(back.skills.technical.get("python"), Some(&9));
    assert_eq!(back.years_experience, Some(15));
}
