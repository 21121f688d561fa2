//! Background cognitive loop: synthesis checks, cleanup, and queued
//! deep-analysis tasks that run while the agent is listening.

use crate::accumulator::ThoughtAccumulator;
use crate::mind::SharedMind;
use crate::processor::CognitiveProcessor;
use crate::thought::Thought;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// How often the loop checks streams for synthesis.
    pub synthesis_check_interval_secs: f64,
    /// How often cleanup runs (expressed in loop iterations internally).
    pub cleanup_interval_secs: f64,
    /// Thoughts older than this are pruned if never externalized.
    pub max_thought_age_minutes: i64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            synthesis_check_interval_secs: 1.0,
            cleanup_interval_secs: 60.0,
            max_thought_age_minutes: 30,
        }
    }
}

/// Status snapshot of the background processor.
#[derive(Clone, Debug, Serialize)]
pub struct BackgroundStatus {
    pub running: bool,
    pub active_background_tasks: usize,
    pub pending_synthesis: usize,
    pub synthesis_check_interval_secs: f64,
    pub cleanup_interval_secs: f64,
    pub max_thought_age_minutes: i64,
}

/// One long-running loop bound to a single agent's mind.
pub struct BackgroundProcessor {
    mind: SharedMind,
    processor: Arc<CognitiveProcessor>,
    accumulator: ThoughtAccumulator,
    config: BackgroundConfig,
    cancel: Mutex<Option<CancellationToken>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundProcessor {
    pub fn new(
        mind: SharedMind,
        processor: Arc<CognitiveProcessor>,
        accumulator: ThoughtAccumulator,
        config: BackgroundConfig,
    ) -> Self {
        Self {
            mind,
            processor,
            accumulator,
            config,
            cancel: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Create with a fresh accumulator over the same mind and processor.
    pub fn with_defaults(mind: SharedMind, processor: Arc<CognitiveProcessor>) -> Self {
        let accumulator = ThoughtAccumulator::new(mind.clone(), processor.clone());
        Self::new(mind, processor, accumulator, BackgroundConfig::default())
    }

    /// Start the processing loop. A second start while running is a no-op.
    pub async fn start(&self) {
        let mut handle_slot = self.handle.lock().await;
        if handle_slot.as_ref().is_some_and(|h| !h.is_finished()) {
            warn!("background processor already running");
            return;
        }

        let token = CancellationToken::new();
        *self.cancel.lock().await = Some(token.clone());

        let mind = self.mind.clone();
        let accumulator = self.accumulator.clone();
        let config = self.config.clone();
        let agent_id = mind.lock().await.agent_id.clone();

        *handle_slot = Some(tokio::spawn(async move {
            run_loop(mind, accumulator, config, token).await;
        }));
        info!("background processor started for agent {agent_id}");
    }

    /// Stop the loop cooperatively and await its termination.
    pub async fn stop(&self) {
        if let Some(token) = self.cancel.lock().await.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
        let agent_id = self.mind.lock().await.agent_id.clone();
        info!("background processor stopped for agent {agent_id}");
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Queue a deep analysis to run concurrently. The result is added to the
    /// mind and passed to the optional callback.
    pub async fn queue_deep_analysis(
        &self,
        stimulus: impl Into<String>,
        purpose: impl Into<String>,
        callback: Option<Box<dyn FnOnce(Thought) + Send + 'static>>,
    ) {
        let stimulus = stimulus.into();
        let purpose = purpose.into();
        let processor = self.processor.clone();
        let mind = self.mind.clone();

        let task_purpose = purpose.clone();
        let task: JoinHandle<Option<Thought>> = tokio::spawn(async move {
            let result = processor
                .process(&stimulus, 0.1, 0.9, 0.7, &task_purpose, None)
                .await;

            match result {
                Ok(result) => {
                    if let Some(thought) = result.primary_thought {
                        mind.lock().await.add_thought(thought.clone());
                        debug!(
                            "background analysis complete: {task_purpose} (confidence: {:.2})",
                            thought.confidence
                        );
                        if let Some(callback) = callback {
                            callback(thought.clone());
                        }
                        Some(thought)
                    } else {
                        None
                    }
                }
                Err(e) => {
                    error!("background analysis failed: {e}");
                    None
                }
            }
        });

        self.mind.lock().await.background_tasks.push(task);
        debug!("queued background analysis: {purpose}");
    }

    /// Queue a synthesis task for a topic's stream. No-op if no stream
    /// matches.
    pub async fn queue_synthesis(&self, topic: impl Into<String>) -> bool {
        let topic = topic.into();
        {
            let mind = self.mind.lock().await;
            if mind.get_stream_for_topic(&topic).is_none() {
                return false;
            }
        }

        let accumulator = self.accumulator.clone();
        let task_topic = topic.clone();
        let task: JoinHandle<Option<Thought>> = tokio::spawn(async move {
            match accumulator.force_synthesis_on_topic(&task_topic).await {
                Ok(thought) => thought,
                Err(e) => {
                    error!("background synthesis failed: {e}");
                    None
                }
            }
        });

        self.mind.lock().await.background_tasks.push(task);
        debug!("queued background synthesis for topic: {topic}");
        true
    }

    pub async fn status(&self) -> BackgroundStatus {
        let pending = self.accumulator.pending_synthesis_count().await;
        let active_tasks = {
            let mind = self.mind.lock().await;
            mind.background_tasks
                .iter()
                .filter(|t| !t.is_finished())
                .count()
        };
        BackgroundStatus {
            running: self.is_running().await,
            active_background_tasks: active_tasks,
            pending_synthesis: pending,
            synthesis_check_interval_secs: self.config.synthesis_check_interval_secs,
            cleanup_interval_secs: self.config.cleanup_interval_secs,
            max_thought_age_minutes: self.config.max_thought_age_minutes,
        }
    }
}

async fn run_loop(
    mind: SharedMind,
    accumulator: ThoughtAccumulator,
    config: BackgroundConfig,
    cancel: CancellationToken,
) {
    let interval = Duration::from_secs_f64(config.synthesis_check_interval_secs.max(0.01));
    let cleanup_every =
        (config.cleanup_interval_secs / config.synthesis_check_interval_secs).max(1.0) as u64;
    let mut loop_count: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            debug!("background processor cancelled");
            break;
        }

        let iteration = async {
            let synthesized = accumulator.check_streams_for_synthesis().await?;
            if !synthesized.is_empty() {
                debug!("background synthesized {} streams", synthesized.len());
            }

            loop_count += 1;
            if loop_count >= cleanup_every {
                let cleaned = mind
                    .lock()
                    .await
                    .cleanup_old_thoughts(config.max_thought_age_minutes);
                if cleaned > 0 {
                    debug!("background cleaned up {cleaned} old thoughts");
                }
                loop_count = 0;
            }

            mind.lock().await.background_tasks.retain(|t| !t.is_finished());
            Ok::<(), ponder_core::Error>(())
        };

        let backoff = match iteration.await {
            Ok(()) => interval,
            Err(e) => {
                error!("background processor error: {e}");
                ERROR_BACKOFF
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("background processor cancelled");
                break;
            }
            _ = tokio::time::sleep(backoff) => {}
        }
    }
}
