//! Agent profile value types and prompt-facing formatting.
//!
//! Profiles are consumed, not owned: the engine assumes any provided profile
//! is complete and valid. Persistence and field validation belong to whatever
//! layer constructs them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Language complexity the agent uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyLevel {
    Simple,
    #[default]
    Moderate,
    Technical,
    Academic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceStructure {
    Terse,
    #[default]
    Moderate,
    Elaborate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Casual,
    #[default]
    Professional,
    Formal,
}

impl VocabularyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            VocabularyLevel::Simple => "simple",
            VocabularyLevel::Moderate => "moderate",
            VocabularyLevel::Technical => "technical",
            VocabularyLevel::Academic => "academic",
        }
    }
}

impl SentenceStructure {
    pub fn as_str(self) -> &'static str {
        match self {
            SentenceStructure::Terse => "terse",
            SentenceStructure::Moderate => "moderate",
            SentenceStructure::Elaborate => "elaborate",
        }
    }
}

impl Formality {
    pub fn as_str(self) -> &'static str {
        match self {
            Formality::Casual => "casual",
            Formality::Professional => "professional",
            Formality::Formal => "formal",
        }
    }
}

/// How the agent communicates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommunicationStyle {
    #[serde(default)]
    pub vocabulary_level: VocabularyLevel,
    #[serde(default)]
    pub sentence_structure: SentenceStructure,
    #[serde(default)]
    pub formality: Formality,
    #[serde(default = "default_true")]
    pub uses_analogies: bool,
    #[serde(default = "default_true")]
    pub uses_examples: bool,
    #[serde(default = "default_true")]
    pub asks_clarifying_questions: bool,
    #[serde(default)]
    pub summarizes_frequently: bool,
    #[serde(default)]
    pub verbal_tics: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CommunicationStyle {
    fn default() -> Self {
        Self {
            vocabulary_level: VocabularyLevel::default(),
            sentence_structure: SentenceStructure::default(),
            formality: Formality::default(),
            uses_analogies: true,
            uses_examples: true,
            asks_clarifying_questions: true,
            summarizes_frequently: false,
            verbal_tics: Vec::new(),
        }
    }
}

/// Agent skills, all on a 0-10 scale.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(default)]
    pub technical: HashMap<String, u8>,
    #[serde(default)]
    pub domains: HashMap<String, u8>,
    #[serde(default)]
    pub soft_skills: HashMap<String, u8>,
}

impl SkillSet {
    /// All skills flattened into one map.
    pub fn all_skills(&self) -> HashMap<String, u8> {
        let mut all = self.technical.clone();
        all.extend(self.domains.clone());
        all.extend(self.soft_skills.clone());
        all
    }

    /// Top N skills across all categories, highest level first.
    /// Ties break alphabetically so formatting stays deterministic.
    pub fn top_skills(&self, n: usize) -> Vec<(String, u8)> {
        let mut skills: Vec<(String, u8)> = self.all_skills().into_iter().collect();
        skills.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        skills.truncate(n);
        skills
    }

    /// Relevance of this skill set to a keyword list.
    ///
    /// Each keyword matches at most one skill, by substring overlap in either
    /// direction. Score is the summed matched levels over `keywords.len() * 10`.
    pub fn relevance_score(&self, keywords: &[String]) -> f64 {
        if keywords.is_empty() {
            return 0.0;
        }

        let all = self.all_skills();
        let mut matched: Vec<u8> = Vec::new();

        for keyword in keywords {
            let kw = keyword.to_lowercase().replace([' ', '-'], "_");
            for (skill, level) in &all {
                let skill_lower = skill.to_lowercase();
                if skill_lower.contains(&kw) || kw.contains(&skill_lower) {
                    matched.push(*level);
                    break;
                }
            }
        }

        if matched.is_empty() {
            return 0.0;
        }
        matched.iter().map(|l| f64::from(*l)).sum::<f64>() / (keywords.len() as f64 * 10.0)
    }
}

/// Core personality traits (0-10 scale).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonalityMarkers {
    pub openness: u8,
    pub conscientiousness: u8,
    pub extraversion: u8,
    pub agreeableness: u8,
    pub neuroticism: u8,
    pub perfectionism: u8,
    pub pragmatism: u8,
    pub risk_tolerance: u8,
}

impl Default for PersonalityMarkers {
    fn default() -> Self {
        Self {
            openness: 5,
            conscientiousness: 5,
            extraversion: 5,
            agreeableness: 5,
            neuroticism: 5,
            perfectionism: 5,
            pragmatism: 5,
            risk_tolerance: 5,
        }
    }
}

/// Social behavior traits (0-10 scale).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocialMarkers {
    pub confidence: u8,
    pub assertiveness: u8,
    pub deference: u8,
    pub curiosity: u8,
    pub social_calibration: u8,
    pub status_sensitivity: u8,
    pub facilitation_instinct: u8,
    pub comfort_in_spotlight: u8,
    pub comfort_with_conflict: u8,
}

impl Default for SocialMarkers {
    fn default() -> Self {
        Self {
            confidence: 5,
            assertiveness: 5,
            deference: 5,
            curiosity: 5,
            social_calibration: 5,
            status_sensitivity: 5,
            facilitation_instinct: 5,
            comfort_in_spotlight: 5,
            comfort_with_conflict: 5,
        }
    }
}

/// Full agent profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_id: Uuid,
    pub name: String,
    pub role: String,
    pub title: Option<String>,
    pub backstory_summary: String,
    pub years_experience: Option<u32>,

    pub skills: SkillSet,
    pub personality_markers: PersonalityMarkers,
    pub social_markers: SocialMarkers,
    pub communication_style: CommunicationStyle,

    #[serde(default)]
    pub knowledge_domains: Vec<String>,
    #[serde(default)]
    pub knowledge_gaps: Vec<String>,
}

impl AgentProfile {
    /// Minimal profile with defaults; builder methods fill in the rest.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            agent_id: Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            title: None,
            backstory_summary: String::new(),
            years_experience: None,
            skills: SkillSet::default(),
            personality_markers: PersonalityMarkers::default(),
            social_markers: SocialMarkers::default(),
            communication_style: CommunicationStyle::default(),
            knowledge_domains: Vec::new(),
            knowledge_gaps: Vec::new(),
        }
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory_summary = backstory.into();
        self
    }

    pub fn with_technical_skill(mut self, skill: impl Into<String>, level: u8) -> Self {
        self.skills.technical.insert(skill.into(), level.min(10));
        self
    }

    pub fn with_domain_skill(mut self, skill: impl Into<String>, level: u8) -> Self {
        self.skills.domains.insert(skill.into(), level.min(10));
        self
    }

    pub fn with_social_markers(mut self, markers: SocialMarkers) -> Self {
        self.social_markers = markers;
        self
    }

    pub fn with_years_experience(mut self, years: u32) -> Self {
        self.years_experience = Some(years);
        self
    }

    // -----------------------------------------------------------------------
    // Identity formatting for prompts. All output is deterministic given the
    // profile so prompt caching stays effective across identical requests.
    // -----------------------------------------------------------------------

    /// Minimal identity for REFLEX (~50 tokens).
    pub fn identity_minimal(&self) -> String {
        format!("You are {}, a {}.", self.name, self.role)
    }

    /// Brief identity for REACTIVE (~150 tokens): name, role, top-3 skills.
    pub fn identity_brief(&self) -> String {
        let top = self.skills.top_skills(3);
        let skills: Vec<String> = top.iter().map(|(s, _)| s.replace('_', " ")).collect();

        let mut lines = vec![
            format!("You are {}, a {}.", self.name, self.role),
            format!("Key skills: {}.", skills.join(", ")),
        ];
        if let Some(years) = self.years_experience {
            lines.push(format!("Experience: {} years.", years));
        }
        lines.join("\n")
    }

    /// Full identity for DELIBERATE and above (~400 tokens).
    pub fn identity_full(&self) -> String {
        let top = self.skills.top_skills(5);
        let skills = top
            .iter()
            .map(|(s, level)| format!("- {}: {}/10", s.replace('_', " "), level))
            .collect::<Vec<_>>()
            .join("\n");

        let intro = match &self.title {
            Some(title) => format!("You are {}, {}, a {}.", self.name, title, self.role),
            None => format!("You are {}, a {}.", self.name, self.role),
        };

        let mut lines = vec![
            "IDENTITY:".to_string(),
            intro,
            String::new(),
            self.backstory_summary.clone(),
            String::new(),
            "SKILLS & EXPERTISE:".to_string(),
            skills,
        ];

        if !self.knowledge_domains.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "Domain expertise: {}",
                self.knowledge_domains.join(", ")
            ));
        }

        let comm = &self.communication_style;
        lines.push(String::new());
        lines.push("COMMUNICATION STYLE:".to_string());
        lines.push(format!("- Vocabulary: {}", comm.vocabulary_level.as_str()));
        lines.push(format!("- Formality: {}", comm.formality.as_str()));
        lines.push(format!("- Structure: {}", comm.sentence_structure.as_str()));

        lines.join("\n")
    }

    /// Social trait summary for group settings.
    pub fn social_style_summary(&self) -> String {
        let sm = &self.social_markers;
        let mut traits = Vec::new();

        if sm.confidence >= 7 {
            traits.push("You express your views confidently");
        } else if sm.confidence <= 3 {
            traits.push("You tend to hedge your opinions");
        }

        if sm.deference >= 7 {
            traits.push("You readily defer to others' expertise");
        } else if sm.deference <= 3 {
            traits.push("You stand firm on your positions");
        }

        if sm.curiosity >= 7 {
            traits.push("You ask probing questions to understand deeply");
        }

        if sm.facilitation_instinct >= 7 {
            traits.push("You help draw out others' perspectives");
        }

        if sm.assertiveness >= 7 {
            traits.push("You advocate strongly for your ideas");
        } else if sm.assertiveness <= 3 {
            traits.push("You prefer to suggest rather than assert");
        }

        if sm.comfort_with_conflict >= 7 {
            traits.push("You're comfortable engaging in constructive disagreement");
        } else if sm.comfort_with_conflict <= 3 {
            traits.push("You prefer to find common ground over confrontation");
        }

        if sm.comfort_in_spotlight <= 3 {
            traits.push("You prefer not to be the center of attention");
        }

        if traits.is_empty() {
            return "You have a balanced social style.".to_string();
        }
        traits
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Personality trait summary describing the agent's thinking style.
    pub fn thinking_style_summary(&self) -> String {
        let pm = &self.personality_markers;
        let mut traits = Vec::new();

        if pm.openness >= 7 {
            traits.push("You're open to novel ideas and unconventional approaches");
        } else if pm.openness <= 3 {
            traits.push("You prefer proven approaches over experimental ones");
        }

        if pm.conscientiousness >= 7 {
            traits.push("You're detail-oriented and thorough");
        } else if pm.conscientiousness <= 3 {
            traits.push("You focus on the big picture over details");
        }

        if pm.pragmatism >= 7 {
            traits.push("You favor practical solutions over ideal ones");
        } else if pm.perfectionism >= 7 {
            traits.push("You strive for excellence and high standards");
        }

        if pm.risk_tolerance >= 7 {
            traits.push("You're comfortable with uncertainty and calculated risks");
        } else if pm.risk_tolerance <= 3 {
            traits.push("You prefer certainty and well-tested approaches");
        }

        if traits.is_empty() {
            return "You have a balanced thinking style.".to_string();
        }
        traits
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
