use crate::core::{Result, StoreError, StoredEntity};
use std::collections::{HashMap, HashSet};

/// The authoritative in-memory set of one entity type, tracking which
/// members still need a disk flush.
///
/// Callers never hold one of these directly; every instance lives behind
/// the per-type mutex owned by its [`crate::storage::EntityAccess`], which
/// is what makes `drain_dirty` atomic with respect to concurrent `add` and
/// `replace` calls.
#[derive(Debug, Clone)]
pub struct ChangeTrackingCollection<T: StoredEntity> {
    entries: HashMap<i32, T>,
    dirty: HashSet<i32>,
}

impl<T: StoredEntity> ChangeTrackingCollection<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    /// Builds a collection from entities already on disk: everything is
    /// clean, nothing needs a flush.
    pub fn from_entries(entities: Vec<T>) -> Self {
        Self {
            entries: entities.into_iter().map(|e| (e.id(), e)).collect(),
            dirty: HashSet::new(),
        }
    }

    /// Inserts a new entity and marks it dirty. An id collision means the
    /// id-assignment exclusion was violated somewhere, so it is reported
    /// as a hard error rather than an overwrite.
    pub fn add(&mut self, entity: T) -> Result<()> {
        let id = entity.id();
        if self.entries.contains_key(&id) {
            return Err(StoreError::AlreadyExists(T::TYPE_NAME, id));
        }
        self.entries.insert(id, entity);
        self.dirty.insert(id);
        Ok(())
    }

    /// Replaces the entity with the same id and marks it dirty.
    pub fn replace(&mut self, entity: T) -> Result<()> {
        let id = entity.id();
        if !self.entries.contains_key(&id) {
            return Err(StoreError::NotFound(T::TYPE_NAME, id));
        }
        self.entries.insert(id, entity);
        self.dirty.insert(id);
        Ok(())
    }

    pub fn get(&self, id: i32) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Owned snapshot of the current content. Iterating the result cannot
    /// observe mutations made after this call.
    pub fn all(&self) -> Vec<T> {
        self.entries.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The next identifier to assign: `max(existing) + 1`, or 1 for an
    /// empty collection. Ids are never reused.
    pub fn next_id(&self) -> i32 {
        self.entries.keys().max().map_or(1, |max| max + 1)
    }

    /// Returns and clears the set of entities needing a flush.
    pub fn drain_dirty(&mut self) -> Vec<T> {
        let ids: Vec<i32> = self.dirty.drain().collect();
        ids.iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect()
    }

    /// Re-marks entities dirty, used when a flush fails and the entities
    /// must be retried by a later flush.
    pub fn mark_dirty(&mut self, ids: impl IntoIterator<Item = i32>) {
        self.dirty.extend(ids);
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }
}

impl<T: StoredEntity> Default for ChangeTrackingCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Content equality: same entities by id, independent of insertion order
/// and of what still needs flushing.
impl<T: StoredEntity> PartialEq for ChangeTrackingCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
