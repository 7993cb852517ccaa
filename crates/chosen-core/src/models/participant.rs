use chosen_store::{FieldViolation, Record, ValidationContext};
use serde::{Deserialize, Serialize};

use super::checks;
use super::enums::ParticipantRole;

/// A person taking part in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub role: ParticipantRole,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl Participant {
    pub fn new(name: impl Into<String>, role: ParticipantRole) -> Self {
        Self {
            name: name.into(),
            role,
            email: None,
            company: None,
        }
    }
}

impl Record for Participant {
    const TYPE_NAME: &'static str = "Participant";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "role"];

    fn validate(&self, _context: &ValidationContext) -> Vec<FieldViolation> {
        self.email
            .as_deref()
            .and_then(|email| checks::email("email", email))
            .into_iter()
            .collect()
    }
}
