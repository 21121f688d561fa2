//! Core types for Ponder: errors, the cognitive tier catalog, and agent profiles.

pub mod error;
pub mod profile;
pub mod tier;

pub use error::{Error, Result};
pub use profile::{
    AgentProfile, CommunicationStyle, Formality, PersonalityMarkers, SentenceStructure, SkillSet,
    SocialMarkers, VocabularyLevel,
};
pub use tier::{
    tier_config, CognitiveTier, ContextDepth, MemoryAccess, ResponseFormat, TierConfig,
};
