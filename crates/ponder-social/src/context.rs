//! Social context: what an agent perceives about the current conversation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Group classification by size. Smaller groups allow frequent
/// contributions; larger groups demand selectivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    /// 1 - full engagement
    Solo,
    /// 2 - active collaboration
    Pair,
    /// 3-6 - role-based contribution
    SmallTeam,
    /// 7-20 - selective contribution
    Meeting,
    /// 21-100 - highly selective
    LargeGroup,
    /// 100+ - respond only to direct address
    Army,
}

impl GroupType {
    pub fn classify(group_size: usize) -> Self {
        match group_size {
            0 | 1 => GroupType::Solo,
            2 => GroupType::Pair,
            3..=6 => GroupType::SmallTeam,
            7..=20 => GroupType::Meeting,
            21..=100 => GroupType::LargeGroup,
            _ => GroupType::Army,
        }
    }

    /// Minimum expertise relevance that justifies taking speaking time.
    pub fn contribution_threshold(self) -> f64 {
        match self {
            GroupType::Solo => 0.0,
            GroupType::Pair => 0.3,
            GroupType::SmallTeam => 0.4,
            GroupType::Meeting => 0.5,
            GroupType::LargeGroup => 0.7,
            GroupType::Army => 0.9,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionPhase {
    Opening,
    #[default]
    Exploring,
    Debating,
    Deciding,
    Closing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    /// High tension or conflict
    Heated,
    #[default]
    Engaged,
    Neutral,
    Flagging,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusLevel {
    Aligned,
    #[default]
    Discussing,
    Divided,
    Conflicted,
}

/// The agent's role within this conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Facilitator,
    Leader,
    Expert,
    #[default]
    Participant,
    Junior,
    Observer,
}

impl ParticipantRole {
    /// Turn-taking multiplier over an equal share: facilitators are expected
    /// to speak twice the fair share, observers far less.
    pub fn speaking_multiplier(self) -> f64 {
        match self {
            ParticipantRole::Facilitator => 2.0,
            ParticipantRole::Leader => 1.5,
            ParticipantRole::Expert => 1.3,
            ParticipantRole::Participant => 1.0,
            ParticipantRole::Junior => 0.8,
            ParticipantRole::Observer => 0.3,
        }
    }
}

/// What an agent knows or can observe about another participant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub agent_id: String,
    pub name: String,
    pub role: String,
    pub expertise_areas: Vec<String>,

    // Observed state
    pub has_spoken: bool,
    pub contribution_count: u32,
    pub seems_engaged: bool,
    /// Their apparent stance on the current topic, if readable.
    pub apparent_position: Option<String>,
}

impl ParticipantInfo {
    pub fn new(agent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            role: "participant".to_string(),
            expertise_areas: Vec::new(),
            has_spoken: false,
            contribution_count: 0,
            seems_engaged: true,
            apparent_position: None,
        }
    }

    pub fn with_expertise(mut self, areas: Vec<String>) -> Self {
        self.expertise_areas = areas;
        self
    }
}

/// Everything the agent perceives about the current social situation.
/// This is the primary input to externalization decisions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SocialContext {
    pub participants: Vec<ParticipantInfo>,
    /// Total participants including self.
    pub group_size: usize,

    // My position
    pub my_role: ParticipantRole,

    // Current dynamics
    pub current_speaker: Option<String>,
    pub topic_under_discussion: String,
    pub discussion_phase: DiscussionPhase,

    // Expertise map: skill -> agent IDs who have it
    pub expertise_present: HashMap<String, Vec<String>>,
    pub expertise_gaps: Vec<String>,

    // Conversational state: agent ID -> contribution count
    pub speaking_distribution: HashMap<String, u32>,
    pub energy_level: EnergyLevel,
    pub consensus_level: ConsensusLevel,
}

impl SocialContext {
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            ..Self::default()
        }
    }

    pub fn group_type(&self) -> GroupType {
        GroupType::classify(self.group_size)
    }

    pub fn get_participant(&self, agent_id: &str) -> Option<&ParticipantInfo> {
        self.participants.iter().find(|p| p.agent_id == agent_id)
    }

    /// Record that an agent started speaking. This is the single source of
    /// truth for the speaking distribution and participant counters; callers
    /// must not bump them separately.
    pub fn update_speaker(&mut self, agent_id: &str) {
        self.current_speaker = Some(agent_id.to_string());
        *self
            .speaking_distribution
            .entry(agent_id.to_string())
            .or_insert(0) += 1;

        if let Some(participant) = self
            .participants
            .iter_mut()
            .find(|p| p.agent_id == agent_id)
        {
            participant.has_spoken = true;
            participant.contribution_count += 1;
        }
    }

    pub fn total_contributions(&self) -> u32 {
        self.speaking_distribution.values().sum()
    }

    /// An agent's proportion of all contributions so far.
    pub fn contribution_share(&self, agent_id: &str) -> f64 {
        let total = self.total_contributions();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.speaking_distribution.get(agent_id).copied().unwrap_or(0)) / f64::from(total)
    }

    /// The expected proportion if contributions were spread evenly.
    pub fn fair_share(&self) -> f64 {
        if self.group_size == 0 {
            return 0.0;
        }
        1.0 / self.group_size as f64
    }

    /// Agent IDs known to have a given expertise (substring match in either
    /// direction).
    pub fn participants_with_expertise(&self, skill: &str) -> Vec<String> {
        let skill_lower = skill.to_lowercase();
        for (expertise, agent_ids) in &self.expertise_present {
            let expertise_lower = expertise.to_lowercase();
            if expertise_lower.contains(&skill_lower) || skill_lower.contains(&expertise_lower) {
                return agent_ids.clone();
            }
        }
        Vec::new()
    }

    pub fn has_expert_for(&self, topic: &str) -> bool {
        topic
            .to_lowercase()
            .split_whitespace()
            .any(|keyword| !self.participants_with_expertise(keyword).is_empty())
    }
}
