//! Conversation tracking on top of the Chosen data store
//!
//! Wires the file and YAML layers into an application: [`Settings`] say
//! where data lives, [`models`] define what is stored, [`repositories`]
//! decide how it is laid out and locked, and [`AppContext`] owns one of each.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod models;
pub mod repositories;

pub use config::{Settings, SettingsLoader};
pub use context::AppContext;
pub use error::{Error, ErrorKind, Result};
pub use repositories::{ConversationRepository, UserSettingsRepository};
