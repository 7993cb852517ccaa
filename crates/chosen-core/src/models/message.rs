use chrono::{DateTime, Utc};
use chosen_store::{FieldViolation, Record, ValidationContext};
use serde::{Deserialize, Serialize};

/// One message in a conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: DateTime<Utc>,
    pub from_name: String,
    #[serde(default)]
    pub to_name: Option<String>,
    /// Mostly set for email.
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
    /// Paths relative to the data directory.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Message {
    pub fn new(from_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            from_name: from_name.into(),
            to_name: None,
            subject: None,
            body: body.into(),
            attachments: Vec::new(),
        }
    }
}

impl Record for Message {
    const TYPE_NAME: &'static str = "Message";
    const REQUIRED_FIELDS: &'static [&'static str] = &["timestamp", "from_name", "body"];

    fn validate(&self, context: &ValidationContext) -> Vec<FieldViolation> {
        self.attachments
            .iter()
            .enumerate()
            .filter_map(|(i, path)| context.check_path(&format!("attachments[{i}]"), path))
            .collect()
    }
}
