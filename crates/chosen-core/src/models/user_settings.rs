use chosen_store::{Entity, FieldViolation, Record, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::checks;
use super::enums::ModelChoice;

/// Id under which the single settings document is stored.
pub const USER_SETTINGS_ID: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_name: String,
    pub user_email: String,
    pub default_model: ModelChoice,
    /// Relative to the data directory.
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl UserSettings {
    pub fn new(user_name: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            user_email: user_email.into(),
            default_model: ModelChoice::default(),
            resume_path: None,
            preferences: Map::new(),
        }
    }
}

impl Record for UserSettings {
    const TYPE_NAME: &'static str = "UserSettings";
    const REQUIRED_FIELDS: &'static [&'static str] = &["user_name", "user_email", "default_model"];

    fn validate(&self, context: &ValidationContext) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        violations.extend(checks::email("user_email", &self.user_email));
        violations.extend(checks::optional_path(
            context,
            "resume_path",
            self.resume_path.as_deref(),
        ));
        violations
    }
}

impl Entity for UserSettings {
    fn id(&self) -> &str {
        USER_SETTINGS_ID
    }
}
