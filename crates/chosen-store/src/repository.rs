//! File-per-entity repositories

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::codec;
use crate::record::{Entity, Record};
use crate::store::YamlStore;
use crate::{Error, Result};

/// Top-level field name to the value it must equal in the entity's tree.
pub type Filters = BTreeMap<String, serde_json::Value>;

/// Page size used when a caller has no preference.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// CRUD over entities of type `E`, keyed by id.
///
/// `get` and `delete` report a missing entity as `None` / `false`; only
/// genuine faults come back as errors.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Directory holding this repository's files.
    fn data_dir(&self) -> &Path;

    /// File that stores the entity with `id`. Defaults to `<data_dir>/<id>.yaml`.
    fn entity_path(&self, id: &str) -> PathBuf {
        self.data_dir().join(format!("{id}.yaml"))
    }

    async fn get(&self, id: &str) -> Result<Option<E>>;

    /// Entities whose fields equal every value in `filters`, skipping
    /// `offset` matches and returning at most `limit`.
    async fn list(&self, filters: &Filters, limit: usize, offset: usize) -> Result<Vec<E>>;

    async fn save(&self, entity: E) -> Result<E>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Generic [`Repository`] storing each entity as `<data_dir>/<id>.yaml`.
///
/// The `*_at` methods work on explicit paths so repositories with their own
/// path mapping can reuse the same load, save and delete rules.
#[derive(Debug)]
pub struct YamlRepository<E> {
    data_dir: PathBuf,
    store: YamlStore,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> YamlRepository<E> {
    /// Open a repository rooted at `data_dir`, creating the directory.
    pub async fn open(data_dir: impl Into<PathBuf>, store: YamlStore) -> Result<Self> {
        let data_dir = data_dir.into();
        store.files().create_directory(&data_dir, true).await?;
        Ok(Self {
            data_dir,
            store,
            _entity: PhantomData,
        })
    }

    pub fn store(&self) -> &YamlStore {
        &self.store
    }

    /// Map `id` to its file after checking it is a plain file name.
    pub fn checked_path(&self, id: &str) -> Result<PathBuf> {
        chosen_fs::validate_path_component(id).map_err(|reason| Error::InvalidEntityId {
            id: id.to_string(),
            reason,
        })?;
        Ok(Repository::<E>::entity_path(self, id))
    }

    pub async fn load_at(&self, path: &Path) -> Result<Option<E>> {
        if !self.store.files().file_exists(path).await {
            return Ok(None);
        }
        match self.store.load(path).await {
            Ok(entity) => Ok(Some(entity)),
            // Deleted between the check and the read.
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save_at(&self, entity: &E, path: &Path) -> Result<()> {
        self.store.save(entity, path).await
    }

    pub async fn delete_at(&self, path: &Path) -> Result<bool> {
        if !self.store.files().file_exists(path).await {
            return Ok(false);
        }
        Ok(self.store.files().delete_file(path).await?)
    }

    /// Every entity in the directory, in file name order.
    pub async fn load_all(&self) -> Result<Vec<E>> {
        let paths = match self.store.files().list_directory(&self.data_dir, "*.yaml").await {
            Ok(paths) => paths,
            Err(chosen_fs::Error::DirectoryNotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entities = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(entity) = self.load_at(&path).await? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for YamlRepository<E> {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn get(&self, id: &str) -> Result<Option<E>> {
        let path = self.checked_path(id)?;
        self.load_at(&path).await
    }

    async fn list(&self, filters: &Filters, limit: usize, offset: usize) -> Result<Vec<E>> {
        let entities = self.load_all().await?;
        let matching = retain_matching(entities, filters)?;
        Ok(paginate(matching, limit, offset))
    }

    async fn save(&self, entity: E) -> Result<E> {
        let path = self.checked_path(entity.id())?;
        self.save_at(&entity, &path).await?;
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.checked_path(id)?;
        self.delete_at(&path).await
    }
}

/// Whether every filter equals the same-named top-level field of `record`.
pub fn matches_filters<R: Record>(record: &R, filters: &Filters) -> Result<bool> {
    if filters.is_empty() {
        return Ok(true);
    }
    let tree = codec::to_tree(record)?;
    Ok(filters
        .iter()
        .all(|(field, expected)| tree.get(field) == Some(expected)))
}

pub fn retain_matching<R: Record>(records: Vec<R>, filters: &Filters) -> Result<Vec<R>> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if matches_filters(&record, filters)? {
            kept.push(record);
        }
    }
    Ok(kept)
}

pub fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}
