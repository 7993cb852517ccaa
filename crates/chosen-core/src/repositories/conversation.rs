use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chosen_fs::LockManager;
use chosen_store::repository::{paginate, retain_matching};
use chosen_store::{Filters, Repository, YamlRepository, YamlStore};

use crate::models::Conversation;
use crate::{Error, Result};

/// Conversations stored as `<data_dir>/<id>.yaml`.
///
/// Writes go through the advisory lock for the target file, and `list`
/// returns the most recently updated conversations first.
#[derive(Debug)]
pub struct ConversationRepository {
    inner: YamlRepository<Conversation>,
    locks: Arc<LockManager>,
    lock_timeout: Duration,
}

impl ConversationRepository {
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        store: YamlStore,
        locks: Arc<LockManager>,
        lock_timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            inner: YamlRepository::open(data_dir, store).await?,
            locks,
            lock_timeout,
        })
    }

    /// Load, modify and save a conversation under one lock.
    ///
    /// `updated_at` is stamped after `f` runs. Fails with
    /// [`Error::ConversationNotFound`] if there is nothing to update.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<Conversation>
    where
        F: FnOnce(&mut Conversation) + Send,
    {
        let path = self.inner.checked_path(id)?;
        let inner = &self.inner;
        let target = path.as_path();

        self.locks
            .run_locked(target, self.lock_timeout, move || async move {
                let mut conversation = inner
                    .load_at(target)
                    .await?
                    .ok_or_else(|| Error::ConversationNotFound { id: id.to_string() })?;
                f(&mut conversation);
                conversation.touch();
                inner.save_at(&conversation, target).await?;
                Ok::<_, Error>(conversation)
            })
            .await
    }

    pub async fn archive(&self, id: &str, reason: Option<String>) -> Result<Conversation> {
        let conversation = self.update(id, |c| c.archive(reason)).await?;
        tracing::info!(id, "Conversation archived");
        Ok(conversation)
    }

    pub async fn unarchive(&self, id: &str) -> Result<Conversation> {
        let conversation = self.update(id, Conversation::unarchive).await?;
        tracing::info!(id, "Conversation unarchived");
        Ok(conversation)
    }
}

#[async_trait]
impl Repository<Conversation> for ConversationRepository {
    fn data_dir(&self) -> &Path {
        self.inner.data_dir()
    }

    async fn get(&self, id: &str) -> chosen_store::Result<Option<Conversation>> {
        self.inner.get(id).await
    }

    async fn list(
        &self,
        filters: &Filters,
        limit: usize,
        offset: usize,
    ) -> chosen_store::Result<Vec<Conversation>> {
        let mut conversations = retain_matching(self.inner.load_all().await?, filters)?;
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(paginate(conversations, limit, offset))
    }

    async fn save(&self, mut entity: Conversation) -> chosen_store::Result<Conversation> {
        entity.touch();
        let path = self.inner.checked_path(&entity.id)?;
        let inner = &self.inner;
        let (record, target) = (&entity, path.as_path());

        self.locks
            .run_locked(target, self.lock_timeout, move || async move {
                inner.save_at(record, target).await
            })
            .await?;
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> chosen_store::Result<bool> {
        let path = self.inner.checked_path(id)?;
        let inner = &self.inner;
        let target = path.as_path();

        self.locks
            .run_locked(target, self.lock_timeout, move || async move {
                inner.delete_at(target).await
            })
            .await
    }
}
