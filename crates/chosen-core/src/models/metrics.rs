use chosen_store::{FieldViolation, Record, ValidationContext};
use serde::{Deserialize, Serialize};

use super::checks;

/// Response times and message counts for both sides of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMetrics {
    pub recruiter_avg_hours: Option<f64>,
    pub candidate_avg_hours: Option<f64>,
    pub recruiter_message_count: u32,
    pub candidate_message_count: u32,
}

impl Record for ResponseMetrics {
    const TYPE_NAME: &'static str = "ResponseMetrics";

    fn validate(&self, _context: &ValidationContext) -> Vec<FieldViolation> {
        [
            ("recruiter_avg_hours", self.recruiter_avg_hours),
            ("candidate_avg_hours", self.candidate_avg_hours),
        ]
        .into_iter()
        .filter_map(|(location, value)| value.and_then(|v| checks::non_negative(location, v)))
        .collect()
    }
}
