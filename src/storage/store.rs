use crate::core::Result;
use crate::model::{Employee, Project, Session, SubmittedPeriod, TimeEntry, User};
use crate::storage::persistence::LoadedCollections;
use crate::storage::{ChangeTrackingCollection, DiskPersistenceController, EntityAccess};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

type Shared<T> = Arc<Mutex<ChangeTrackingCollection<T>>>;

fn shared<T: crate::core::StoredEntity>(collection: ChangeTrackingCollection<T>) -> Shared<T> {
    Arc::new(Mutex::new(collection))
}

/// The whole in-memory database: one change-tracking collection per entity
/// type plus, when started against a directory, the disk controller that
/// keeps them durable.
///
/// There is no process-wide instance; callers construct a store and pass
/// it by reference to every collaborator.
#[derive(Debug)]
pub struct EntityStore {
    employees: Shared<Employee>,
    users: Shared<User>,
    projects: Shared<Project>,
    time_entries: Shared<TimeEntry>,
    sessions: Shared<Session>,
    submitted_periods: Shared<SubmittedPeriod>,
    disk: Option<Arc<DiskPersistenceController>>,
}

impl EntityStore {
    /// Starts the store.
    ///
    /// - `directory == None`: memory-only, no disk I/O ever performed.
    /// - directory absent on disk: fresh store; the directory tree is
    ///   created lazily by the first flush.
    /// - directory present: full recovery of every persisted entity, or a
    ///   [`crate::StoreError::CorruptRecovery`] if any record is bad.
    pub fn start(directory: Option<PathBuf>) -> Result<Self> {
        let Some(root) = directory else {
            return Ok(Self::memory_only());
        };

        let disk = DiskPersistenceController::new(root);
        let loaded = disk.load_all()?;
        disk.run()?;
        let disk = Some(Arc::new(disk));

        Ok(match loaded {
            Some(collections) => Self::from_collections(collections, disk),
            None => Self::empty(disk),
        })
    }

    /// A store that never touches disk, mainly for tests and for
    /// speculative copies.
    pub fn memory_only() -> Self {
        Self::empty(None)
    }

    fn empty(disk: Option<Arc<DiskPersistenceController>>) -> Self {
        Self {
            employees: shared(ChangeTrackingCollection::new()),
            users: shared(ChangeTrackingCollection::new()),
            projects: shared(ChangeTrackingCollection::new()),
            time_entries: shared(ChangeTrackingCollection::new()),
            sessions: shared(ChangeTrackingCollection::new()),
            submitted_periods: shared(ChangeTrackingCollection::new()),
            disk,
        }
    }

    fn from_collections(
        collections: LoadedCollections,
        disk: Option<Arc<DiskPersistenceController>>,
    ) -> Self {
        Self {
            employees: shared(collections.employees),
            users: shared(collections.users),
            projects: shared(collections.projects),
            time_entries: shared(collections.time_entries),
            sessions: shared(collections.sessions),
            submitted_periods: shared(collections.submitted_periods),
            disk,
        }
    }

    pub fn employees(&self) -> EntityAccess<Employee> {
        EntityAccess::new(Arc::clone(&self.employees), self.disk.clone())
    }

    pub fn users(&self) -> EntityAccess<User> {
        EntityAccess::new(Arc::clone(&self.users), self.disk.clone())
    }

    pub fn projects(&self) -> EntityAccess<Project> {
        EntityAccess::new(Arc::clone(&self.projects), self.disk.clone())
    }

    pub fn time_entries(&self) -> EntityAccess<TimeEntry> {
        EntityAccess::new(Arc::clone(&self.time_entries), self.disk.clone())
    }

    pub fn sessions(&self) -> EntityAccess<Session> {
        EntityAccess::new(Arc::clone(&self.sessions), self.disk.clone())
    }

    pub fn submitted_periods(&self) -> EntityAccess<SubmittedPeriod> {
        EntityAccess::new(Arc::clone(&self.submitted_periods), self.disk.clone())
    }

    /// Every accepted mutation was already flushed synchronously, so stop
    /// only releases the disk controller. Reads keep working; further
    /// mutations fail at flush time.
    pub fn stop(&self) -> Result<()> {
        if let Some(disk) = &self.disk {
            disk.stop()?;
        }
        Ok(())
    }

    /// An independent, deep, memory-only copy: mutations on either side
    /// are invisible to the other and the copy can never touch disk.
    pub fn copy(&self) -> Result<EntityStore> {
        Ok(Self {
            employees: shared(self.employees.lock()?.clone()),
            users: shared(self.users.lock()?.clone()),
            projects: shared(self.projects.lock()?.clone()),
            time_entries: shared(self.time_entries.lock()?.clone()),
            sessions: shared(self.sessions.lock()?.clone()),
            submitted_periods: shared(self.submitted_periods.lock()?.clone()),
            disk: None,
        })
    }

    /// Content equality across all six entity types, independent of
    /// insertion order and pending flushes.
    pub fn content_eq(&self, other: &EntityStore) -> Result<bool> {
        Ok(*self.employees.lock()? == *other.employees.lock()?
            && *self.users.lock()? == *other.users.lock()?
            && *self.projects.lock()? == *other.projects.lock()?
            && *self.time_entries.lock()? == *other.time_entries.lock()?
            && *self.sessions.lock()? == *other.sessions.lock()?
            && *self.submitted_periods.lock()? == *other.submitted_periods.lock()?)
    }
}
