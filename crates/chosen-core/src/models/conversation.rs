use chrono::{DateTime, Utc};
use chosen_store::{Entity, FieldViolation, Record, ValidationContext, ViolationKind, record::nest_all};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analysis::{ContextAnalysis, JobFitScore};
use super::checks;
use super::enums::{Platform, ProcessStatus};
use super::message::Message;
use super::metrics::ResponseMetrics;

/// A conversation thread with a recruiter.
///
/// Archive fields must agree with each other: `archived_at` is set exactly
/// when `archived` is true, and `archive_reason` only while archived. Use
/// [`Conversation::archive`] and [`Conversation::unarchive`] to change them
/// together; inconsistent documents are rejected on load and save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    pub platform: Platform,
    #[serde(default)]
    pub company: Option<String>,
    /// Agency the recruiter works for, when different from `company`.
    #[serde(default)]
    pub recruiting_company: Option<String>,
    pub recruiter_name: String,
    #[serde(default)]
    pub process_status: ProcessStatus,
    /// The user's own notes.
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub context_analysis: Option<ContextAnalysis>,
    #[serde(default)]
    pub fit_score: Option<JobFitScore>,
    #[serde(default)]
    pub response_metrics: Option<ResponseMetrics>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_description_filepath: Option<String>,
    #[serde(default)]
    pub resume_filepath: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archive_reason: Option<String>,
    #[serde(default)]
    pub related_conversation_ids: Vec<String>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Conversation {
    /// A fresh conversation with a generated id and both timestamps set to now.
    pub fn new(platform: Platform, recruiter_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            platform,
            company: None,
            recruiting_company: None,
            recruiter_name: recruiter_name.into(),
            process_status: ProcessStatus::default(),
            context: Vec::new(),
            messages: Vec::new(),
            context_analysis: None,
            fit_score: None,
            response_metrics: None,
            job_description: None,
            job_description_filepath: None,
            resume_filepath: None,
            archived: false,
            archived_at: None,
            archive_reason: None,
            related_conversation_ids: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Archive now. Re-archiving keeps the original `archived_at`.
    pub fn archive(&mut self, reason: Option<String>) {
        if !self.archived || self.archived_at.is_none() {
            self.archived_at = Some(Utc::now());
        }
        self.archived = true;
        self.archive_reason = reason;
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
        self.archived_at = None;
        self.archive_reason = None;
    }

    fn archive_violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.archived {
            if self.archived_at.is_none() {
                violations.push(FieldViolation::new(
                    "archived_at",
                    ViolationKind::Missing,
                    "required when archived is true",
                ));
            }
        } else {
            if self.archived_at.is_some() {
                violations.push(FieldViolation::new(
                    "archived_at",
                    ViolationKind::InvalidValue,
                    "must be null when archived is false",
                ));
            }
            if self.archive_reason.is_some() {
                violations.push(FieldViolation::new(
                    "archive_reason",
                    ViolationKind::InvalidValue,
                    "must be null when archived is false",
                ));
            }
        }
        violations
    }
}

impl Record for Conversation {
    const TYPE_NAME: &'static str = "Conversation";
    const REQUIRED_FIELDS: &'static [&'static str] = &["platform", "recruiter_name"];

    fn validate(&self, context: &ValidationContext) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if let Err(reason) = chosen_fs::validate_path_component(&self.id) {
            violations.push(FieldViolation::new("id", ViolationKind::InvalidValue, reason));
        }

        for (i, message) in self.messages.iter().enumerate() {
            violations.extend(nest_all(message.validate(context), &format!("messages[{i}]")));
        }
        if let Some(ref analysis) = self.context_analysis {
            violations.extend(nest_all(analysis.validate(context), "context_analysis"));
        }
        if let Some(ref fit) = self.fit_score {
            violations.extend(nest_all(fit.validate(context), "fit_score"));
        }
        if let Some(ref metrics) = self.response_metrics {
            violations.extend(nest_all(metrics.validate(context), "response_metrics"));
        }

        violations.extend(checks::optional_path(
            context,
            "job_description_filepath",
            self.job_description_filepath.as_deref(),
        ));
        violations.extend(checks::optional_path(
            context,
            "resume_filepath",
            self.resume_filepath.as_deref(),
        ));

        violations.extend(self.archive_violations());
        violations
    }
}

impl Entity for Conversation {
    fn id(&self) -> &str {
        &self.id
    }
}
