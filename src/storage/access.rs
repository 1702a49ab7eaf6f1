use crate::core::{Result, StoredEntity};
use crate::storage::{ChangeTrackingCollection, DiskPersistenceController};
use log::warn;
use std::sync::{Arc, Mutex};

/// The only path by which callers mutate or query one entity type.
///
/// Holds the per-type mutex; identifier assignment, insertion, and the
/// synchronous disk flush all happen inside a single lock region, so no
/// two threads can compute the same next id and an accepted mutation is
/// durable before the call returns.
///
/// Cloning produces another handle onto the same collection, not a copy.
pub struct EntityAccess<T: StoredEntity> {
    collection: Arc<Mutex<ChangeTrackingCollection<T>>>,
    disk: Option<Arc<DiskPersistenceController>>,
}

impl<T: StoredEntity> Clone for EntityAccess<T> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            disk: self.disk.clone(),
        }
    }
}

impl<T: StoredEntity> EntityAccess<T> {
    pub(crate) fn new(
        collection: Arc<Mutex<ChangeTrackingCollection<T>>>,
        disk: Option<Arc<DiskPersistenceController>>,
    ) -> Self {
        Self { collection, disk }
    }

    /// Creates an entity, letting the store pick the identifier. The
    /// closure receives the assigned id and builds the full entity.
    pub fn create_with<F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(i32) -> Result<T>,
    {
        self.act_on(|collection| {
            let id = collection.next_id();
            let entity = build(id)?;
            collection.add(entity.clone())?;
            Ok(entity)
        })
    }

    /// Scoped access to the locked collection, for check-then-act
    /// sequences that must not interleave with other mutations of this
    /// type. Anything the body dirtied is flushed before the lock is
    /// released; if the body fails, dirtied entities stay queued for the
    /// next flush.
    pub fn act_on<R>(
        &self,
        body: impl FnOnce(&mut ChangeTrackingCollection<T>) -> Result<R>,
    ) -> Result<R> {
        let mut collection = self.collection.lock()?;
        let outcome = body(&mut collection)?;
        self.flush_dirty(&mut collection)?;
        Ok(outcome)
    }

    pub fn find_by_id(&self, id: i32) -> Result<Option<T>> {
        let collection = self.collection.lock()?;
        Ok(collection.get(id).cloned())
    }

    pub fn find_all(&self) -> Result<Vec<T>> {
        let collection = self.collection.lock()?;
        Ok(collection.all())
    }

    pub fn find_where(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        let collection = self.collection.lock()?;
        Ok(collection.iter().filter(|e| predicate(e)).cloned().collect())
    }

    pub fn count(&self) -> Result<usize> {
        let collection = self.collection.lock()?;
        Ok(collection.len())
    }

    /// Replaces an existing entity by id and flushes.
    pub fn update(&self, entity: T) -> Result<()> {
        self.act_on(|collection| collection.replace(entity))
    }

    /// Drains the dirty set and writes it out. On failure the in-memory
    /// mutation is kept and the entities are re-marked dirty, so the next
    /// successful flush of this type retries them; the caller still sees
    /// the error.
    fn flush_dirty(&self, collection: &mut ChangeTrackingCollection<T>) -> Result<()> {
        let Some(disk) = &self.disk else {
            return Ok(());
        };
        if collection.dirty_count() == 0 {
            return Ok(());
        }
        let dirty = collection.drain_dirty();
        if let Err(err) = disk.flush_entities(&dirty) {
            warn!(
                "flush of {} dirty {} entities failed, keeping them queued: {err}",
                dirty.len(),
                T::TYPE_NAME
            );
            collection.mark_dirty(dirty.iter().map(|e| e.id()));
            return Err(err);
        }
        Ok(())
    }
}
