//! Accumulates thoughts from stimuli and synthesizes thought streams.
//!
//! This is what enables "listening" behavior: low-effort observations build
//! up in the mind until a stream's trigger fires, then the accumulated
//! thoughts are synthesized into one INSIGHT that supersedes them.

use crate::mind::SharedMind;
use crate::processor::CognitiveProcessor;
use crate::prompts::ProcessContext;
use crate::thought::{Thought, ThoughtType};
use ponder_core::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Summary of current accumulation, for observability.
#[derive(Clone, Debug, Serialize)]
pub struct AccumulationSummary {
    pub total_streams: usize,
    pub needs_synthesis: usize,
    pub total_accumulated_thoughts: usize,
    pub ready_to_share: usize,
    pub held_insights: usize,
}

#[derive(Clone)]
pub struct ThoughtAccumulator {
    mind: SharedMind,
    processor: Arc<CognitiveProcessor>,
}

impl ThoughtAccumulator {
    pub fn new(mind: SharedMind, processor: Arc<CognitiveProcessor>) -> Self {
        Self { mind, processor }
    }

    pub fn mind(&self) -> &SharedMind {
        &self.mind
    }

    /// Process an observation with low cognitive effort and add the primary
    /// thought (if any) to the mind.
    pub async fn process_observation(
        &self,
        stimulus: &str,
        relevance: f64,
        context: Option<&ProcessContext>,
    ) -> Result<Option<Thought>> {
        let result = self
            .processor
            .process(stimulus, 0.2, 0.3, relevance, "observation", context)
            .await?;

        if let Some(thought) = &result.primary_thought {
            self.mind.lock().await.add_thought(thought.clone());
            debug!(
                "processed observation, added thought to mind (confidence: {:.2})",
                thought.confidence
            );
        }

        Ok(result.primary_thought)
    }

    /// Synthesize a stream's accumulated thoughts into one coherent INSIGHT.
    ///
    /// Requires at least 2 thoughts. On success the stream is CONCLUDED, its
    /// source thoughts are superseded, and the synthesis is queued to share
    /// (confidence > 0.6) or held as an insight.
    pub async fn synthesize_stream(&self, stream_id: Uuid) -> Result<Option<Thought>> {
        // Snapshot under the lock, then release it across the model call.
        let (topic, thoughts) = {
            let mind = self.mind.lock().await;
            let Some(stream) = mind.get_stream(stream_id) else {
                return Ok(None);
            };
            (stream.topic.clone(), mind.stream_thoughts(stream_id))
        };

        if thoughts.len() < 2 {
            debug!("stream '{topic}' has too few thoughts for synthesis");
            return Ok(None);
        }

        let thoughts_text = thoughts
            .iter()
            .map(|t| format!("- {} (confidence: {:.1})", t.content, t.confidence))
            .collect::<Vec<_>>()
            .join("\n");

        let synthesis_stimulus = format!(
            "I've been thinking about: {topic}\n\n\
             My observations and thoughts so far:\n{thoughts_text}\n\n\
             Synthesize these into ONE clear, coherent point that captures the key insight or conclusion."
        );

        let mut context = ProcessContext::default().with_prior_thoughts(thoughts_text);
        context.stream_topic = Some(topic.clone());
        context.thought_count = Some(thoughts.len());

        let result = self
            .processor
            .process(&synthesis_stimulus, 0.3, 0.6, 0.8, "synthesis", Some(&context))
            .await?;

        let Some(mut synthesis) = result.primary_thought else {
            warn!("synthesis failed for stream '{topic}'");
            return Ok(None);
        };
        synthesis.thought_type = ThoughtType::Insight;

        {
            let mut mind = self.mind.lock().await;
            mind.apply_synthesis(stream_id, synthesis.clone());
        }

        if synthesis.confidence > 0.6 {
            debug!(
                "synthesis ready to share: '{topic}' (confidence: {:.2})",
                synthesis.confidence
            );
        } else {
            debug!(
                "synthesis held as insight: '{topic}' (confidence: {:.2})",
                synthesis.confidence
            );
        }

        Ok(Some(synthesis))
    }

    /// Synthesize every stream currently flagged NEEDS_SYNTHESIS.
    pub async fn check_streams_for_synthesis(&self) -> Result<Vec<Thought>> {
        let stream_ids = self.mind.lock().await.streams_needing_synthesis();

        let mut synthesized = Vec::new();
        for stream_id in stream_ids {
            if let Some(thought) = self.synthesize_stream(stream_id).await? {
                synthesized.push(thought);
            }
        }

        if !synthesized.is_empty() {
            info!("synthesized {} streams", synthesized.len());
        }
        Ok(synthesized)
    }

    pub async fn pending_synthesis_count(&self) -> usize {
        self.mind.lock().await.streams_needing_synthesis().len()
    }

    /// Force synthesis of the stream matching a topic, even if its trigger
    /// has not fired yet. Still requires 2 thoughts.
    pub async fn force_synthesis_on_topic(&self, topic: &str) -> Result<Option<Thought>> {
        let stream_id = {
            let mind = self.mind.lock().await;
            match mind.get_stream_for_topic(topic) {
                Some(stream) => stream.stream_id,
                None => {
                    debug!("no stream found for topic: '{topic}'");
                    return Ok(None);
                }
            }
        };
        self.synthesize_stream(stream_id).await
    }

    pub async fn accumulation_summary(&self) -> AccumulationSummary {
        let mind = self.mind.lock().await;
        let state = mind.state();
        AccumulationSummary {
            total_streams: state.streams,
            needs_synthesis: state.streams_needing_synthesis,
            total_accumulated_thoughts: state.active_thoughts,
            ready_to_share: state.ready_to_share,
            held_insights: state.held_insights,
        }
    }
}
