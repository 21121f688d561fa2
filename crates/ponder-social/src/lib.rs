//! Social intelligence for Ponder agents: given a stimulus and the social
//! context of a conversation, decide whether to speak, listen, or stay
//! passively aware.

pub mod context;
pub mod intelligence;
pub mod intent;
pub mod stimulus;

pub use context::{
    ConsensusLevel, DiscussionPhase, EnergyLevel, GroupType, ParticipantInfo, ParticipantRole,
    SocialContext,
};
pub use intelligence::SocialIntelligence;
pub use intent::{
    ContributionTiming, ContributionType, ExternalizationDecision, ExternalizationIntent,
};
pub use stimulus::Stimulus;
