//! Repositories for the conversation-tracking records

pub mod conversation;
pub mod user_settings;

pub use conversation::ConversationRepository;
pub use user_settings::UserSettingsRepository;
