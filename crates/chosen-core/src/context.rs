//! Application wiring

use std::sync::Arc;

use chosen_fs::{FileHandler, LockManager};
use chosen_store::{ValidationContext, YamlStore};

use crate::Result;
use crate::config::Settings;
use crate::repositories::{ConversationRepository, UserSettingsRepository};

/// Everything a request handler needs, built once per application.
///
/// All repositories share one [`LockManager`], so locks taken through any
/// of them are visible in the same registry.
#[derive(Debug)]
pub struct AppContext {
    settings: Settings,
    files: FileHandler,
    locks: Arc<LockManager>,
    store: YamlStore,
    conversations: ConversationRepository,
    user_settings: UserSettingsRepository,
}

impl AppContext {
    /// Create the data directory tree and the repositories over it.
    pub async fn open(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let files = FileHandler::new();
        files.create_directory(&settings.data_dir, true).await?;

        let locks = Arc::new(LockManager::with_poll_interval(
            settings.lock_poll_interval(),
        ));
        let store = YamlStore::new(
            files,
            ValidationContext::with_data_root(&settings.data_dir),
        );

        let conversations = ConversationRepository::open(
            settings.conversations_dir(),
            store.clone(),
            Arc::clone(&locks),
            settings.lock_timeout(),
        )
        .await?;
        let user_settings = UserSettingsRepository::open(
            settings.settings_dir(),
            store.clone(),
            Arc::clone(&locks),
            settings.lock_timeout(),
        )
        .await?;

        tracing::info!(data_dir = %settings.data_dir.display(), "Data store opened");

        Ok(Self {
            settings,
            files,
            locks,
            store,
            conversations,
            user_settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn files(&self) -> &FileHandler {
        &self.files
    }

    pub fn locks(&self) -> &Arc<LockManager> {
        &self.locks
    }

    pub fn store(&self) -> &YamlStore {
        &self.store
    }

    pub fn conversations(&self) -> &ConversationRepository {
        &self.conversations
    }

    pub fn user_settings(&self) -> &UserSettingsRepository {
        &self.user_settings
    }
}
