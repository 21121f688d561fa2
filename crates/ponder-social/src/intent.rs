//! Externalization decisions: the outcomes of a social evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The agent's decision about whether and how to contribute, from mandatory
/// response down to background monitoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalizationIntent {
    /// Directly addressed, must answer
    MustRespond,
    /// My expertise is specifically needed
    ShouldContribute,
    /// I have value to add
    MayContribute,
    /// Engaged but not contributing (learning or deferring)
    ActiveListen,
    /// Background noise
    PassiveAwareness,
}

/// The type of contribution the agent plans to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    /// Answering a direct question
    Response,
    /// Making a point
    Statement,
    /// Asking for clarification
    Question,
    /// Helping the discussion flow
    Facilitation,
    /// Respectful disagreement
    Challenge,
    /// Building on someone's point
    Support,
}

/// When to make the contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTiming {
    Now,
    WaitForOpening,
    WhenAsked,
    EndOfDiscussion,
}

/// Full externalization decision with reasoning.
#[derive(Clone, Debug, Serialize)]
pub struct ExternalizationDecision {
    pub intent: ExternalizationIntent,
    pub confidence: f64,
    pub reason: String,

    // If speaking
    pub contribution_type: Option<ContributionType>,
    pub timing: ContributionTiming,

    /// Factors considered, for observability and tuning.
    pub factors: HashMap<String, serde_json::Value>,
}

impl ExternalizationDecision {
    pub fn should_speak(&self) -> bool {
        matches!(
            self.intent,
            ExternalizationIntent::MustRespond
                | ExternalizationIntent::ShouldContribute
                | ExternalizationIntent::MayContribute
        )
    }

    pub fn is_mandatory(&self) -> bool {
        self.intent == ExternalizationIntent::MustRespond
    }

    pub fn is_optional(&self) -> bool {
        self.intent == ExternalizationIntent::MayContribute
    }

    pub fn should_wait(&self) -> bool {
        self.timing != ContributionTiming::Now
    }

    pub fn must_respond(
        reason: impl Into<String>,
        contribution_type: ContributionType,
        factors: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            intent: ExternalizationIntent::MustRespond,
            confidence: 1.0,
            reason: reason.into(),
            contribution_type: Some(contribution_type),
            timing: ContributionTiming::Now,
            factors,
        }
    }

    pub fn should_contribute(
        confidence: f64,
        reason: impl Into<String>,
        contribution_type: ContributionType,
        factors: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            intent: ExternalizationIntent::ShouldContribute,
            confidence,
            reason: reason.into(),
            contribution_type: Some(contribution_type),
            timing: ContributionTiming::Now,
            factors,
        }
    }

    pub fn may_contribute(
        confidence: f64,
        reason: impl Into<String>,
        timing: ContributionTiming,
        contribution_type: ContributionType,
        factors: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            intent: ExternalizationIntent::MayContribute,
            confidence,
            reason: reason.into(),
            contribution_type: Some(contribution_type),
            timing,
            factors,
        }
    }

    pub fn active_listen(
        confidence: f64,
        reason: impl Into<String>,
        timing: ContributionTiming,
        factors: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            intent: ExternalizationIntent::ActiveListen,
            confidence,
            reason: reason.into(),
            contribution_type: None,
            timing,
            factors,
        }
    }

    pub fn passive_awareness(
        confidence: f64,
        reason: impl Into<String>,
        factors: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            intent: ExternalizationIntent::PassiveAwareness,
            confidence,
            reason: reason.into(),
            contribution_type: None,
            timing: ContributionTiming::WhenAsked,
            factors,
        }
    }
}
