//! A tiny simulated standup: one agent listens to teammates, accumulates
//! observations, synthesizes them in the background, and decides when to
//! speak. Runs entirely on mock model clients.
//!
//!     cargo run --example standup

use ponder_cognition::{BackgroundProcessor, CognitiveProcessor, InternalMind, ThoughtAccumulator};
use ponder_core::{AgentProfile, SocialMarkers};
use ponder_llm::mock_router;
use ponder_social::{ParticipantInfo, SocialContext, SocialIntelligence, Stimulus};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ponder_cognition=debug".into()),
        )
        .init();

    let agent = Arc::new(
        AgentProfile::new("Mara", "backend engineer")
            .with_backstory("Ten years building data pipelines and storage systems.")
            .with_technical_skill("python", 9)
            .with_technical_skill("databases", 8)
            .with_domain_skill("data_engineering", 8)
            .with_years_experience(10)
            .with_social_markers(SocialMarkers {
                curiosity: 7,
                ..SocialMarkers::default()
            }),
    );

    let (router, _mocks) = mock_router(15.0);
    let router = Arc::new(router);
    let processor = Arc::new(CognitiveProcessor::new(agent.clone(), router.clone()));

    let mind = InternalMind::shared(agent.agent_id.to_string());
    let accumulator = ThoughtAccumulator::new(mind.clone(), processor.clone());
    let background = BackgroundProcessor::with_defaults(mind.clone(), processor.clone());
    background.start().await;

    // Teammates talk; Mara accumulates low-effort observations.
    for line in [
        "The nightly ETL job failed again around 2am.",
        "The ETL failures started after the schema migration on Tuesday.",
        "ETL retries are hammering the warehouse and slowing the morning dashboards.",
    ] {
        accumulator.process_observation(line, 0.8, None).await?;
    }

    // Give the background loop a moment to synthesize the stream.
    tokio::time::sleep(Duration::from_secs(3)).await;

    let summary = accumulator.accumulation_summary().await;
    println!(
        "streams: {}, ready to share: {}, held: {}",
        summary.total_streams, summary.ready_to_share, summary.held_insights
    );

    // A direct question arrives: should Mara speak?
    let stimulus = Stimulus::direct_question(
        "Mara, what do you think is going on with the ETL job?",
        vec![agent.agent_id.to_string()],
        "etl job failures",
    );

    let mut context = SocialContext::new(4);
    context.participants = vec![
        ParticipantInfo::new("p1", "Jon").with_expertise(vec!["frontend".into()]),
        ParticipantInfo::new("p2", "Priya").with_expertise(vec!["design".into()]),
    ];
    context.topic_under_discussion = "etl job failures".into();
    context.update_speaker("p1");
    context.current_speaker = None;

    let social = SocialIntelligence::new(agent.clone());
    let decision = {
        let mind_guard = mind.lock().await;
        social.should_i_speak(&stimulus, &context, &mind_guard)
    };
    println!(
        "decision: {:?} (confidence {:.2}, reason: {})",
        decision.intent, decision.confidence, decision.reason
    );

    if decision.should_speak() {
        let contribution = {
            let mind_guard = mind.lock().await;
            mind_guard.get_best_contribution().cloned()
        };
        match contribution {
            Some(thought) => {
                println!("Mara says: {}", thought.content);
                mind.lock().await.mark_externalized(thought.id);
            }
            None => {
                // Nothing synthesized yet; think on the spot instead.
                let result = processor
                    .process(&stimulus.content, 0.9, 0.6, 0.9, "direct_question", None)
                    .await?;
                if let Some(thought) = result.primary_thought {
                    println!("Mara says: {}", thought.content);
                }
            }
        }
    }

    background.stop().await;
    router.close().await;
    Ok(())
}
