//! Conversation-tracking records
//!
//! Every type here is a [`chosen_store::Record`]; nested records report
//! their violations under the parent field, e.g. `messages[2].attachments[0]`.

pub mod analysis;
mod checks;
pub mod conversation;
pub mod enums;
pub mod message;
pub mod metrics;
pub mod participant;
pub mod user_settings;

pub use analysis::{ActionItems, ContextAnalysis, ConversationStage, JobFitScore, SentimentTrend};
pub use conversation::Conversation;
pub use enums::{ModelChoice, ParticipantRole, Platform, ProcessStatus};
pub use message::Message;
pub use metrics::ResponseMetrics;
pub use participant::Participant;
pub use user_settings::{USER_SETTINGS_ID, UserSettings};
