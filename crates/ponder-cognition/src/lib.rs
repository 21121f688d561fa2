//! The cognitive core of Ponder: tiered processing of stimuli into thoughts,
//! the internal mind workspace, thought accumulation/synthesis, and the
//! background processing loop.

pub mod accumulator;
pub mod background;
pub mod config;
pub mod mind;
pub mod processor;
pub mod prompts;
pub mod thought;

pub use accumulator::{AccumulationSummary, ThoughtAccumulator};
pub use background::{BackgroundConfig, BackgroundProcessor, BackgroundStatus};
pub use config::EngineConfig;
pub use mind::{
    DetailedMindState, InternalMind, MindState, SharedMind, StreamStatus, StreamSummary,
    ThoughtStream,
};
pub use processor::CognitiveProcessor;
pub use prompts::{MemoryContextProvider, ProcessContext, PromptBuilder};
pub use thought::{CognitiveResult, PlannedStep, ProcessingStrategy, Thought, ThoughtType};
