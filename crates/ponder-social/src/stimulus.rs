//! Incoming stimuli: messages, events, and other communications an agent
//! might need to respond to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const KEYWORD_STOP_WORDS: [&str; 104] = [
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "as", "into", "through", "during", "before", "after", "above", "below", "between",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only",
    "own", "same", "so", "than", "too", "very", "just", "and", "but", "if", "or", "because",
    "until", "while", "about", "against", "this", "that", "these", "those", "it", "its", "i",
    "you", "we", "they", "he", "she", "my", "your", "our", "their", "his", "her",
];

fn is_keyword_stop_word(word: &str) -> bool {
    KEYWORD_STOP_WORDS.contains(&word)
}

/// An incoming stimulus an agent may evaluate for response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stimulus {
    pub content: String,
    pub source_id: Option<String>,
    pub source_name: Option<String>,
    /// Agent IDs this is directed at; `None` means broadcast to all.
    pub directed_at: Option<Vec<String>>,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    /// How urgent or important this stimulus is (0-1).
    pub priority: f64,
    pub requires_response: bool,
}

impl Stimulus {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_id: None,
            source_name: None,
            directed_at: None,
            topic: String::new(),
            timestamp: Utc::now(),
            priority: 0.5,
            requires_response: false,
        }
    }

    /// Stimulus from a plain message; the topic auto-extracts from content
    /// keywords unless provided.
    pub fn from_message(content: impl Into<String>, topic: Option<&str>) -> Self {
        let mut stimulus = Self::new(content);
        match topic {
            Some(topic) => stimulus.topic = topic.to_string(),
            None => {
                let keywords = stimulus.extract_keywords();
                stimulus.topic = keywords
                    .into_iter()
                    .take(5)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
        stimulus
    }

    /// A direct question aimed at specific agents; marked as requiring a
    /// response with elevated priority.
    pub fn direct_question(
        content: impl Into<String>,
        directed_at: Vec<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            directed_at: Some(directed_at),
            topic: topic.into(),
            requires_response: true,
            priority: 0.8,
            ..Self::new(content)
        }
    }

    pub fn with_source(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self.source_name = Some(name.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.directed_at.as_ref().map_or(true, |d| d.is_empty())
    }

    pub fn is_directed(&self) -> bool {
        !self.is_broadcast()
    }

    /// True if directed at this agent by ID or (case-insensitive) name.
    pub fn is_directed_at(&self, agent_id: &str, agent_name: Option<&str>) -> bool {
        let Some(targets) = &self.directed_at else {
            return false;
        };

        if targets.iter().any(|t| t == agent_id) {
            return true;
        }

        if let Some(name) = agent_name {
            let name_lower = name.to_lowercase();
            return targets.iter().any(|t| t.to_lowercase() == name_lower);
        }

        false
    }

    /// True if the content mentions the agent by name or `@name`.
    pub fn mentions_agent(&self, agent_name: &str) -> bool {
        let content_lower = self.content.to_lowercase();
        let name_lower = agent_name.to_lowercase();
        content_lower.contains(&name_lower) || content_lower.contains(&format!("@{name_lower}"))
    }

    /// Lowercased keywords for topic matching: stop words and short words
    /// filtered, punctuation stripped.
    pub fn extract_keywords(&self) -> Vec<String> {
        self.content
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 2 && !is_keyword_stop_word(w))
            .map(|w| {
                w.trim_matches(|c: char| ".,!?;:\"'()[]{}".contains(c))
                    .to_string()
            })
            .filter(|w| !w.is_empty())
            .collect()
    }
}
