//! Results of analysing a conversation

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chosen_store::{FieldViolation, Record, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::checks;

/// How sentiment moved over the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTrend {
    pub initial: String,
    pub current: String,
    /// e.g. improving, stable, declining
    pub direction: String,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStage {
    /// e.g. initial_outreach
    pub current: String,
    pub progression_quality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionItems {
    pub candidate_pending: Vec<String>,
    pub recruiter_pending: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub summary: String,
    pub sentiment_trend: SentimentTrend,
    pub conversation_stage: ConversationStage,
    pub action_items: ActionItems,
    #[serde(default)]
    pub patterns_detected: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub last_analyzed: DateTime<Utc>,
}

impl Record for ContextAnalysis {
    const TYPE_NAME: &'static str = "ContextAnalysis";
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "summary",
        "sentiment_trend",
        "conversation_stage",
        "action_items",
        "last_analyzed",
    ];
}

/// How well a job matches the candidate. Every score is in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFitScore {
    pub overall_score: f64,
    pub required_skills_score: f64,
    pub preferred_skills_score: f64,
    pub experience_match: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Free-form entries, usually with `skill`, `severity` and `mitigation`.
    #[serde(default)]
    pub gaps: Vec<Map<String, Value>>,
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

impl Record for JobFitScore {
    const TYPE_NAME: &'static str = "JobFitScore";
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "overall_score",
        "required_skills_score",
        "preferred_skills_score",
        "experience_match",
    ];

    fn validate(&self, _context: &ValidationContext) -> Vec<FieldViolation> {
        [
            ("overall_score", self.overall_score),
            ("required_skills_score", self.required_skills_score),
            ("preferred_skills_score", self.preferred_skills_score),
            ("experience_match", self.experience_match),
        ]
        .into_iter()
        .filter_map(|(location, value)| checks::score(location, value))
        .collect()
    }
}
