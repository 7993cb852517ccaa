use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chosen_fs::LockManager;
use chosen_store::repository::{paginate, retain_matching};
use chosen_store::{Filters, Repository, YamlRepository, YamlStore};

use crate::Result;
use crate::models::{USER_SETTINGS_ID, UserSettings};

/// The single user settings document, always `<data_dir>/user.yaml`.
#[derive(Debug)]
pub struct UserSettingsRepository {
    inner: YamlRepository<UserSettings>,
    locks: Arc<LockManager>,
    lock_timeout: Duration,
}

impl UserSettingsRepository {
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

    /// The stored settings, or `None` before the first save.
    pub async fn load(&self) -> Result<Option<UserSettings>> {
        Ok(self.get(USER_SETTINGS_ID).await?)
    }

    pub fn path(&self) -> PathBuf {
        self.entity_path(USER_SETTINGS_ID)
    }
}

#[async_trait]
impl Repository<UserSettings> for UserSettingsRepository {
    fn data_dir(&self) -> &Path {
        self.inner.data_dir()
    }

    fn entity_path(&self, _id: &str) -> PathBuf {
        self.data_dir().join(format!("{USER_SETTINGS_ID}.yaml"))
    }

    async fn get(&self, id: &str) -> chosen_store::Result<Option<UserSettings>> {
        self.inner.load_at(&self.entity_path(id)).await
    }

    async fn list(
        &self,
        filters: &Filters,
        limit: usize,
        offset: usize,
    ) -> chosen_store::Result<Vec<UserSettings>> {
        let all: Vec<_> = self.get(USER_SETTINGS_ID).await?.into_iter().collect();
        Ok(paginate(retain_matching(all, filters)?, limit, offset))
    }

    async fn save(&self, entity: UserSettings) -> chosen_store::Result<UserSettings> {
        let path = self.entity_path(USER_SETTINGS_ID);
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
        let path = self.entity_path(id);
        let inner = &self.inner;
        let target = path.as_path();

        self.locks
            .run_locked(target, self.lock_timeout, move || async move {
                inner.delete_at(target).await
            })
            .await
    }
}
