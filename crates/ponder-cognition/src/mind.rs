//! The agent's cognitive workspace: thoughts exist here whether they are
//! spoken or not, grouped into topic streams that accumulate toward synthesis.
//!
//! The mind exclusively owns its thoughts. Streams and queues reference them
//! by ID, and external consumers only ever receive clones.

use crate::thought::Thought;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// How the mind is shared between a request handler and the background
/// processor. Mind methods never await, so the lock is held only briefly.
pub type SharedMind = Arc<tokio::sync::Mutex<InternalMind>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Active,
    Paused,
    NeedsSynthesis,
    Concluded,
    Abandoned,
}

/// A stream of related thoughts building toward something.
#[derive(Debug)]
pub struct ThoughtStream {
    pub stream_id: Uuid,
    pub topic: String,
    /// Thought IDs in arrival order. The thoughts themselves live in the
    /// mind's `active_thoughts` map.
    pub thought_ids: Vec<Uuid>,
    pub status: StreamStatus,
    pub created_at: DateTime<Utc>,
    pub synthesized_output: Option<Thought>,
    pub ready_to_externalize: bool,
}

impl ThoughtStream {
    fn new(topic: String) -> Self {
        Self {
            stream_id: Uuid::new_v4(),
            topic,
            thought_ids: Vec::new(),
            status: StreamStatus::Active,
            created_at: Utc::now(),
            synthesized_output: None,
            ready_to_externalize: false,
        }
    }

    pub fn thought_count(&self) -> usize {
        self.thought_ids.len()
    }
}

/// Serializable stream summary.
#[derive(Clone, Debug, Serialize)]
pub struct StreamSummary {
    pub stream_id: Uuid,
    pub topic: String,
    pub thought_count: usize,
    pub status: StreamStatus,
    pub created_at: DateTime<Utc>,
    pub avg_confidence: f64,
    pub avg_completeness: f64,
    pub time_span_seconds: f64,
    pub ready_to_externalize: bool,
    pub has_synthesis: bool,
}

/// Serializable mind snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct MindState {
    pub agent_id: String,
    pub active_thoughts: usize,
    pub streams: usize,
    pub streams_needing_synthesis: usize,
    pub held_insights: usize,
    pub ready_to_share: usize,
    pub background_tasks: usize,
    pub stream_topics: Vec<String>,
}

/// Mind snapshot including per-stream detail and the share queue.
#[derive(Clone, Debug, Serialize)]
pub struct DetailedMindState {
    #[serde(flatten)]
    pub state: MindState,
    pub streams_detail: Vec<StreamSummary>,
    pub ready_thoughts: Vec<ReadyThoughtSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReadyThoughtSummary {
    pub thought_id: Uuid,
    pub tier: ponder_core::CognitiveTier,
    pub confidence: f64,
    pub completeness: f64,
}

pub struct InternalMind {
    pub agent_id: String,

    /// Active thoughts not yet resolved, by ID. Single owner of all state.
    active_thoughts: HashMap<Uuid, Thought>,

    /// Thought streams by stream ID.
    streams: HashMap<Uuid, ThoughtStream>,

    /// Insights held internally (known but not shared), by thought ID.
    held_insights: Vec<Uuid>,

    /// Ready to externalize when appropriate, by thought ID.
    ready_to_share: Vec<Uuid>,

    /// Handles of queued background analysis/synthesis tasks.
    pub background_tasks: Vec<JoinHandle<Option<Thought>>>,
}

impl InternalMind {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            active_thoughts: HashMap::new(),
            streams: HashMap::new(),
            held_insights: Vec::new(),
            ready_to_share: Vec::new(),
            background_tasks: Vec::new(),
        }
    }

    pub fn shared(agent_id: impl Into<String>) -> SharedMind {
        Arc::new(tokio::sync::Mutex::new(Self::new(agent_id)))
    }

    /// Add a thought: store it, assign it to a matching or new stream, and
    /// flag the stream for synthesis if the trigger fires. Returns the
    /// owning stream's ID.
    pub fn add_thought(&mut self, mut thought: Thought) -> Uuid {
        let topic = extract_topic(&thought.content);

        let existing = self
            .streams
            .values()
            .find(|s| {
                matches!(s.status, StreamStatus::Active | StreamStatus::Paused)
                    && topics_related(&s.topic, &topic)
            })
            .map(|s| s.stream_id);

        let stream_id = match existing {
            Some(id) => id,
            None => {
                let stream = ThoughtStream::new(topic.clone());
                let id = stream.stream_id;
                debug!("created new stream for topic: '{topic}'");
                self.streams.insert(id, stream);
                id
            }
        };

        let thought_id = thought.id;
        if let Some(stream) = self.streams.get_mut(&stream_id) {
            // Link back to the most recent thoughts already in the stream
            if !stream.thought_ids.is_empty() {
                let skip = stream.thought_ids.len().saturating_sub(3);
                thought.related_thought_ids = stream.thought_ids[skip..].to_vec();
            }
            stream.thought_ids.push(thought_id);
            debug!(
                "added thought {} to stream '{}' (now {} thoughts)",
                thought_id,
                stream.topic,
                stream.thought_ids.len()
            );
        }
        self.active_thoughts.insert(thought_id, thought);

        if self.should_synthesize(stream_id) {
            if let Some(stream) = self.streams.get_mut(&stream_id) {
                stream.status = StreamStatus::NeedsSynthesis;
                debug!("stream '{}' marked for synthesis", stream.topic);
            }
        }

        stream_id
    }

    /// Hold an insight internally; it affects internal state but is not
    /// queued for externalization.
    pub fn hold_insight(&mut self, thought: Thought) {
        let id = thought.id;
        let entry = self.active_thoughts.entry(id).or_insert(thought);
        entry.externalized = false;
        if !self.held_insights.contains(&id) {
            self.held_insights.push(id);
            debug!("holding insight: {id}");
        }
    }

    /// Mark a thought ready to share when appropriate.
    pub fn prepare_to_share(&mut self, thought: Thought) {
        let id = thought.id;
        self.active_thoughts.entry(id).or_insert(thought);
        if !self.ready_to_share.contains(&id) {
            self.ready_to_share.push(id);
            debug!("prepared to share: {id}");
        }
    }

    /// The best still-relevant thought to share right now: highest
    /// completeness, confidence breaking ties.
    pub fn get_best_contribution(&self) -> Option<&Thought> {
        self.ready_to_share
            .iter()
            .filter_map(|id| self.active_thoughts.get(id))
            .filter(|t| t.still_relevant)
            .max_by(|a, b| {
                a.completeness
                    .partial_cmp(&b.completeness)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(
                        a.confidence
                            .partial_cmp(&b.confidence)
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
            })
    }

    /// Record that a thought was spoken. Idempotent: repeat calls leave the
    /// externalization timestamp untouched.
    pub fn mark_externalized(&mut self, thought_id: Uuid) {
        if let Some(thought) = self.active_thoughts.get_mut(&thought_id) {
            if !thought.externalized {
                thought.externalized = true;
                thought.externalized_at = Some(Utc::now());
                debug!("marked externalized: {thought_id}");
            }
        }
        self.ready_to_share.retain(|id| *id != thought_id);
    }

    /// Mark thoughts about a topic no longer relevant and drop them from the
    /// share queue. Returns the number invalidated.
    pub fn invalidate_thoughts_about(&mut self, topic: &str) -> usize {
        let mut count = 0;

        for thought in self.active_thoughts.values_mut() {
            if thought.still_relevant && thought_relates_to(thought, topic) {
                thought.still_relevant = false;
                count += 1;
            }
        }

        let before = self.ready_to_share.len();
        let active = &self.active_thoughts;
        self.ready_to_share.retain(|id| {
            active
                .get(id)
                .map(|t| !thought_relates_to(t, topic))
                .unwrap_or(false)
        });
        count += before - self.ready_to_share.len();

        if count > 0 {
            debug!("invalidated {count} thoughts about '{topic}'");
        }
        count
    }

    /// Recent thoughts for prompt context, most recent first.
    pub fn thoughts_for_context(&self, n: usize) -> Vec<Thought> {
        let mut recent: Vec<&Thought> = self.active_thoughts.values().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.into_iter().take(n).cloned().collect()
    }

    pub fn get_thought(&self, id: Uuid) -> Option<&Thought> {
        self.active_thoughts.get(&id)
    }

    pub fn get_stream(&self, id: Uuid) -> Option<&ThoughtStream> {
        self.streams.get(&id)
    }

    /// Find a stream whose topic contains the given topic.
    pub fn get_stream_for_topic(&self, topic: &str) -> Option<&ThoughtStream> {
        let topic_lower = topic.to_lowercase();
        self.streams
            .values()
            .find(|s| s.topic.to_lowercase().contains(&topic_lower))
    }

    pub fn streams_needing_synthesis(&self) -> Vec<Uuid> {
        self.streams
            .values()
            .filter(|s| s.status == StreamStatus::NeedsSynthesis)
            .map(|s| s.stream_id)
            .collect()
    }

    /// Resolve a stream's thoughts in order, skipping any the cleanup
    /// already removed.
    pub fn stream_thoughts(&self, stream_id: Uuid) -> Vec<Thought> {
        self.streams
            .get(&stream_id)
            .map(|s| {
                s.thought_ids
                    .iter()
                    .filter_map(|id| self.active_thoughts.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply a synthesis result to a stream: conclude it, supersede its
    /// source thoughts, and queue or hold the synthesis by confidence.
    pub fn apply_synthesis(&mut self, stream_id: Uuid, synthesis: Thought) {
        let synthesis_id = synthesis.id;
        let source_ids = match self.streams.get_mut(&stream_id) {
            Some(stream) => {
                stream.synthesized_output = Some(synthesis.clone());
                stream.ready_to_externalize = true;
                stream.status = StreamStatus::Concluded;
                stream.thought_ids.clone()
            }
            None => return,
        };

        for id in source_ids {
            if let Some(thought) = self.active_thoughts.get_mut(&id) {
                thought.still_relevant = false;
                thought.superseded_by = Some(synthesis_id);
            }
        }

        if synthesis.confidence > 0.6 {
            self.prepare_to_share(synthesis);
        } else {
            self.hold_insight(synthesis);
        }
    }

    pub fn avg_confidence(&self, stream_id: Uuid) -> f64 {
        let thoughts = self.stream_thoughts(stream_id);
        if thoughts.is_empty() {
            return 0.0;
        }
        thoughts.iter().map(|t| t.confidence).sum::<f64>() / thoughts.len() as f64
    }

    pub fn avg_completeness(&self, stream_id: Uuid) -> f64 {
        let thoughts = self.stream_thoughts(stream_id);
        if thoughts.is_empty() {
            return 0.0;
        }
        thoughts.iter().map(|t| t.completeness).sum::<f64>() / thoughts.len() as f64
    }

    /// Seconds from first to last thought in the stream.
    pub fn time_span_seconds(&self, stream_id: Uuid) -> f64 {
        let thoughts = self.stream_thoughts(stream_id);
        if thoughts.len() < 2 {
            return 0.0;
        }
        let first = thoughts[0].created_at;
        let last = thoughts[thoughts.len() - 1].created_at;
        (last - first).num_milliseconds() as f64 / 1000.0
    }

    /// Remove non-externalized thoughts older than the threshold, drop
    /// concluded streams, and drop stale empty streams. Returns the number
    /// of thoughts removed.
    pub fn cleanup_old_thoughts(&mut self, max_age_minutes: i64) -> usize {
        let threshold = Utc::now() - Duration::minutes(max_age_minutes);

        let stale: Vec<Uuid> = self
            .active_thoughts
            .iter()
            .filter(|(_, t)| t.created_at < threshold && !t.externalized)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            self.active_thoughts.remove(id);
            self.ready_to_share.retain(|r| r != id);
            self.held_insights.retain(|r| r != id);
        }

        self.streams.retain(|_, s| {
            if s.status == StreamStatus::Concluded {
                return false;
            }
            !(s.created_at < threshold && s.thought_ids.is_empty())
        });

        if !stale.is_empty() {
            debug!("cleaned up {} old thoughts", stale.len());
        }
        stale.len()
    }

    pub fn held_insight_thoughts(&self) -> Vec<&Thought> {
        self.held_insights
            .iter()
            .filter_map(|id| self.active_thoughts.get(id))
            .collect()
    }

    pub fn ready_to_share_thoughts(&self) -> Vec<&Thought> {
        self.ready_to_share
            .iter()
            .filter_map(|id| self.active_thoughts.get(id))
            .collect()
    }

    pub fn active_thought_count(&self) -> usize {
        self.active_thoughts.len()
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn stream_summary(&self, stream_id: Uuid) -> Option<StreamSummary> {
        let stream = self.streams.get(&stream_id)?;
        Some(StreamSummary {
            stream_id: stream.stream_id,
            topic: stream.topic.clone(),
            thought_count: stream.thought_count(),
            status: stream.status,
            created_at: stream.created_at,
            avg_confidence: self.avg_confidence(stream_id),
            avg_completeness: self.avg_completeness(stream_id),
            time_span_seconds: self.time_span_seconds(stream_id),
            ready_to_externalize: stream.ready_to_externalize,
            has_synthesis: stream.synthesized_output.is_some(),
        })
    }

    pub fn state(&self) -> MindState {
        let active_tasks = self
            .background_tasks
            .iter()
            .filter(|t| !t.is_finished())
            .count();
        MindState {
            agent_id: self.agent_id.clone(),
            active_thoughts: self.active_thoughts.len(),
            streams: self.streams.len(),
            streams_needing_synthesis: self.streams_needing_synthesis().len(),
            held_insights: self.held_insights.len(),
            ready_to_share: self.ready_to_share.len(),
            background_tasks: active_tasks,
            stream_topics: self.streams.values().map(|s| s.topic.clone()).collect(),
        }
    }

    pub fn detailed_state(&self) -> DetailedMindState {
        let streams_detail = self
            .streams
            .keys()
            .filter_map(|id| self.stream_summary(*id))
            .collect();
        let ready_thoughts = self
            .ready_to_share_thoughts()
            .into_iter()
            .map(|t| ReadyThoughtSummary {
                thought_id: t.id,
                tier: t.tier,
                confidence: t.confidence,
                completeness: t.completeness,
            })
            .collect();
        DetailedMindState {
            state: self.state(),
            streams_detail,
            ready_thoughts,
        }
    }

    /// Reset all cognitive state and abort queued tasks.
    pub fn clear(&mut self) {
        self.active_thoughts.clear();
        self.streams.clear();
        self.held_insights.clear();
        self.ready_to_share.clear();
        for task in self.background_tasks.drain(..) {
            task.abort();
        }
        debug!("cleared mind for agent {}", self.agent_id);
    }

    /// Synthesis triggers: 3+ thoughts, or 2+ thoughts spanning >30s with
    /// average confidence >0.6.
    fn should_synthesize(&self, stream_id: Uuid) -> bool {
        let Some(stream) = self.streams.get(&stream_id) else {
            return false;
        };
        if stream.status != StreamStatus::Active {
            return false;
        }

        let count = stream.thought_count();
        if count >= 3 {
            return true;
        }
        if count >= 2
            && self.time_span_seconds(stream_id) > 30.0
            && self.avg_confidence(stream_id) > 0.6
        {
            return true;
        }
        false
    }
}

const TOPIC_STOP_WORDS: [&str; 84] = [
    "i", "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
    "that", "this", "these", "those", "it", "its", "of", "to", "in", "for", "on", "with", "at",
    "by", "from", "as", "into", "through", "during", "before", "after", "and", "but", "or",
    "so", "if", "then", "else", "when", "there", "here", "all", "each", "every", "both", "few",
    "more", "most", "other", "some", "such", "no", "not", "only", "own", "same", "than", "too",
    "very", "just", "also", "now", "about", "think", "thinking", "thought", "seems", "like",
    "really", "actually",
];

fn is_stop_word(word: &str) -> bool {
    TOPIC_STOP_WORDS.contains(&word)
}

/// Extract a topic: the first <=5 significant lowercased words. Falls back
/// to the first 3 raw words when everything is filler.
pub fn extract_topic(content: &str) -> String {
    let lower = content.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    let significant: Vec<&str> = words
        .iter()
        .filter(|w| !is_stop_word(w) && w.len() > 2)
        .take(5)
        .copied()
        .collect();

    if significant.is_empty() {
        words.iter().take(3).copied().collect::<Vec<_>>().join(" ")
    } else {
        significant.join(" ")
    }
}

/// Two topics are related iff their word sets share at least one word.
pub fn topics_related(topic1: &str, topic2: &str) -> bool {
    let words1: std::collections::HashSet<String> =
        topic1.to_lowercase().split_whitespace().map(String::from).collect();
    topic2
        .to_lowercase()
        .split_whitespace()
        .any(|w| words1.contains(w))
}

/// A thought relates to a topic by direct mention or >=2 word overlap.
fn thought_relates_to(thought: &Thought, topic: &str) -> bool {
    let topic_lower = topic.to_lowercase();
    let content_lower = thought.content.to_lowercase();

    if content_lower.contains(&topic_lower) {
        return true;
    }

    let topic_words: std::collections::HashSet<&str> = topic_lower.split_whitespace().collect();
    let overlap = content_lower
        .split_whitespace()
        .collect::<std::collections::HashSet<&str>>()
        .intersection(&topic_words)
        .count();
    overlap >= 2
}
