//! Write-behind disk persistence and full-store recovery.
//!
//! Layout under the database root:
//!
//! ```text
//! <root>/
//!   currentVersion.txt         -- single integer, schema version
//!   Employee/<id>.txt          -- one serialized entity per file
//!   User/<id>.txt
//!   ...
//! ```

use crate::core::{Result, StoreError, StoredEntity};
use crate::model::{Employee, Project, Session, SubmittedPeriod, TimeEntry, User};
use crate::storage::ChangeTrackingCollection;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const VERSION_FILE: &str = "currentVersion.txt";

/// Controller lifecycle. `Loaded` and `Fresh` both lead to `Running`;
/// nothing leads out of `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerState {
    Uninitialized,
    Loaded,
    Fresh,
    Running,
    Stopped,
}

/// Everything `load_all` recovered, one clean collection per entity type.
#[derive(Debug)]
pub struct LoadedCollections {
    pub employees: ChangeTrackingCollection<Employee>,
    pub users: ChangeTrackingCollection<User>,
    pub projects: ChangeTrackingCollection<Project>,
    pub time_entries: ChangeTrackingCollection<TimeEntry>,
    pub sessions: ChangeTrackingCollection<Session>,
    pub submitted_periods: ChangeTrackingCollection<SubmittedPeriod>,
}

/// Durable write-behind persistence: one file per entity, written
/// synchronously as part of the mutating call.
///
/// The state mutex is held across every write, so `stop()` returning
/// guarantees no write is in flight and none will start.
#[derive(Debug)]
pub struct DiskPersistenceController {
    root: PathBuf,
    state: Mutex<ControllerState>,
}

impl DiskPersistenceController {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(ControllerState::Uninitialized),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.root
    }

    /// Startup recovery. `Ok(None)` means no database exists at the root
    /// yet and the caller should build a fresh store; the directory is
    /// only created later, by the first flush.
    ///
    /// Any file that cannot be read, parsed, or validated aborts recovery
    /// with [`StoreError::CorruptRecovery`].
    pub fn load_all(&self) -> Result<Option<LoadedCollections>> {
        let mut state = self.state.lock()?;
        if *state != ControllerState::Uninitialized {
            return Err(StoreError::Persistence(format!(
                "load_all is a startup-only operation, controller is {state:?}"
            )));
        }

        if !self.root.exists() {
            info!("no database at {}, starting fresh", self.root.display());
            *state = ControllerState::Fresh;
            return Ok(None);
        }

        self.verify_schema_version()?;
        let loaded = LoadedCollections {
            employees: self.load_type::<Employee>()?,
            users: self.load_type::<User>()?,
            projects: self.load_type::<Project>()?,
            time_entries: self.load_type::<TimeEntry>()?,
            sessions: self.load_type::<Session>()?,
            submitted_periods: self.load_type::<SubmittedPeriod>()?,
        };
        info!(
            "recovered database at {}: {} employees, {} users, {} projects, {} time entries, {} sessions, {} submitted periods",
            self.root.display(),
            loaded.employees.len(),
            loaded.users.len(),
            loaded.projects.len(),
            loaded.time_entries.len(),
            loaded.sessions.len(),
            loaded.submitted_periods.len(),
        );
        *state = ControllerState::Loaded;
        Ok(Some(loaded))
    }

    /// Transitions into `Running`; flushes are accepted only afterwards.
    pub fn run(&self) -> Result<()> {
        let mut state = self.state.lock()?;
        match *state {
            ControllerState::Loaded | ControllerState::Fresh => {
                *state = ControllerState::Running;
                Ok(())
            }
            other => Err(StoreError::Persistence(format!(
                "cannot start running from {other:?}"
            ))),
        }
    }

    /// Writes one file per dirty entity, synchronously. Existing files for
    /// entities not in `entities` are left untouched.
    pub fn flush_entities<T: StoredEntity>(&self, entities: &[T]) -> Result<()> {
        let state = self.state.lock()?;
        if *state != ControllerState::Running {
            return Err(StoreError::Persistence(format!(
                "flush rejected, controller is {state:?}"
            )));
        }
        if entities.is_empty() {
            return Ok(());
        }

        self.ensure_layout()?;
        let type_dir = self.root.join(T::TYPE_NAME);
        fs::create_dir_all(&type_dir).map_err(|e| {
            StoreError::Persistence(format!(
                "failed to create {}: {e}",
                type_dir.display()
            ))
        })?;

        for entity in entities {
            let serialized = serde_json::to_string_pretty(entity).map_err(|e| {
                StoreError::Persistence(format!(
                    "failed to serialize {} {}: {e}",
                    T::TYPE_NAME,
                    entity.id()
                ))
            })?;
            let path = type_dir.join(format!("{}.txt", entity.id()));
            atomic_write(&path, serialized.as_bytes())?;
            debug!("flushed {} {}", T::TYPE_NAME, entity.id());
        }
        Ok(())
    }

    /// Releases the controller. No further writes happen after this
    /// returns; flush attempts fail with a persistence error.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.state.lock()?;
        *state = ControllerState::Stopped;
        Ok(())
    }

    /// Creates the root directory and the schema-version marker the first
    /// time anything is flushed.
    fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            StoreError::Persistence(format!("failed to create {}: {e}", self.root.display()))
        })?;
        let version_path = self.root.join(VERSION_FILE);
        if !version_path.exists() {
            atomic_write(&version_path, CURRENT_SCHEMA_VERSION.to_string().as_bytes())?;
        }
        Ok(())
    }

    fn verify_schema_version(&self) -> Result<()> {
        let version_path = self.root.join(VERSION_FILE);
        if !version_path.exists() {
            // Directory exists but was never flushed to; treat as empty.
            return Ok(());
        }
        let raw = fs::read_to_string(&version_path).map_err(|e| {
            StoreError::CorruptRecovery(format!("{}: {e}", version_path.display()))
        })?;
        let version: u32 = raw.trim().parse().map_err(|_| {
            StoreError::CorruptRecovery(format!(
                "{}: not an integer schema version: {raw:?}",
                version_path.display()
            ))
        })?;
        if version != CURRENT_SCHEMA_VERSION {
            return Err(StoreError::CorruptRecovery(format!(
                "unsupported schema version {version}, expected {CURRENT_SCHEMA_VERSION}"
            )));
        }
        Ok(())
    }

    fn load_type<T: StoredEntity>(&self) -> Result<ChangeTrackingCollection<T>> {
        let type_dir = self.root.join(T::TYPE_NAME);
        if !type_dir.exists() {
            return Ok(ChangeTrackingCollection::new());
        }

        let dir_entries = fs::read_dir(&type_dir).map_err(|e| {
            StoreError::Persistence(format!("failed to read {}: {e}", type_dir.display()))
        })?;

        let mut entities = Vec::new();
        for dir_entry in dir_entries {
            let path = dir_entry
                .map_err(|e| {
                    StoreError::Persistence(format!(
                        "failed to read {}: {e}",
                        type_dir.display()
                    ))
                })?
                .path();
            if !path.is_file() {
                continue;
            }
            entities.push(read_entity::<T>(&path)?);
        }
        debug!("loaded {} entities from {}", entities.len(), type_dir.display());
        Ok(ChangeTrackingCollection::from_entries(entities))
    }
}

fn read_entity<T: StoredEntity>(path: &Path) -> Result<T> {
    let corrupt = |detail: String| StoreError::CorruptRecovery(format!("{}: {detail}", path.display()));

    let raw = fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
    let entity: T = serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
    entity.validate().map_err(|e| corrupt(e.to_string()))?;

    // The file name is the id; a mismatch means the tree was tampered with.
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    match stem.parse::<i32>() {
        Ok(file_id) if file_id == entity.id() => Ok(entity),
        Ok(file_id) => Err(corrupt(format!(
            "file named {file_id} holds entity with id {}",
            entity.id()
        ))),
        Err(_) => Err(corrupt(format!("file name {stem:?} is not an id"))),
    }
}

/// Write-to-temp-then-rename so a crash mid-write never leaves a truncated
/// file at the final path.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::Persistence(format!("{} has no parent", path.display())))?;
    let failed = |e: &dyn std::fmt::Display| {
        StoreError::Persistence(format!("failed to write {}: {e}", path.display()))
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| failed(&e))?;
    temp.write_all(bytes).map_err(|e| failed(&e))?;
    temp.as_file().sync_all().map_err(|e| failed(&e))?;
    temp.persist(path).map_err(|e| failed(&e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn employee(id: i32, name: &str) -> Employee {
        Employee::new(id, name).unwrap()
    }

    fn running_controller(root: &Path) -> DiskPersistenceController {
        let controller = DiskPersistenceController::new(root);
        assert!(controller.load_all().unwrap().is_none());
        controller.run().unwrap();
        controller
    }

    #[test]
    fn missing_directory_means_no_database() {
        let temp_dir = TempDir::new().unwrap();
        let controller = DiskPersistenceController::new(temp_dir.path().join("db"));
        assert!(controller.load_all().unwrap().is_none());
    }

    #[test]
    fn flush_writes_one_file_per_entity_and_version_marker() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);

        controller
            .flush_entities(&[employee(1, "Bob"), employee(2, "Alice")])
            .unwrap();

        assert!(root.join("Employee").join("1.txt").exists());
        assert!(root.join("Employee").join("2.txt").exists());
        let version = fs::read_to_string(root.join(VERSION_FILE)).unwrap();
        assert_eq!(version.trim(), "1");
    }

    #[test]
    fn flush_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");

        let controller = running_controller(&root);
        controller.flush_entities(&[employee(1, "Bob")]).unwrap();

        let reloaded = DiskPersistenceController::new(&root);
        let loaded = reloaded.load_all().unwrap().unwrap();
        assert_eq!(loaded.employees.len(), 1);
        assert_eq!(loaded.employees.get(1).unwrap().name, "Bob");
        assert_eq!(loaded.employees.dirty_count(), 0);
    }

    #[test]
    fn overwrite_keeps_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);

        controller.flush_entities(&[employee(1, "Bob")]).unwrap();
        controller.flush_entities(&[employee(1, "Robert")]).unwrap();

        let files: Vec<_> = fs::read_dir(root.join("Employee")).unwrap().collect();
        assert_eq!(files.len(), 1);

        let reloaded = DiskPersistenceController::new(&root);
        let loaded = reloaded.load_all().unwrap().unwrap();
        assert_eq!(loaded.employees.get(1).unwrap().name, "Robert");
    }

    #[test]
    fn corrupt_file_aborts_recovery() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);
        controller.flush_entities(&[employee(1, "Bob")]).unwrap();

        fs::write(root.join("Employee").join("1.txt"), "{ not json").unwrap();

        let reloaded = DiskPersistenceController::new(&root);
        let err = reloaded.load_all().unwrap_err();
        assert!(matches!(err, StoreError::CorruptRecovery(_)));
    }

    #[test]
    fn entity_failing_validation_aborts_recovery() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);
        controller.flush_entities(&[employee(1, "Bob")]).unwrap();

        // Structurally valid JSON, invalid entity (empty name).
        fs::write(
            root.join("Employee").join("1.txt"),
            r#"{"id":1,"name":""}"#,
        )
        .unwrap();

        let reloaded = DiskPersistenceController::new(&root);
        assert!(matches!(
            reloaded.load_all().unwrap_err(),
            StoreError::CorruptRecovery(_)
        ));
    }

    #[test]
    fn mismatched_file_name_aborts_recovery() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);
        controller.flush_entities(&[employee(1, "Bob")]).unwrap();

        let dir = root.join("Employee");
        fs::copy(dir.join("1.txt"), dir.join("9.txt")).unwrap();

        let reloaded = DiskPersistenceController::new(&root);
        assert!(matches!(
            reloaded.load_all().unwrap_err(),
            StoreError::CorruptRecovery(_)
        ));
    }

    #[test]
    fn unsupported_schema_version_aborts_recovery() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);
        controller.flush_entities(&[employee(1, "Bob")]).unwrap();

        fs::write(root.join(VERSION_FILE), "99").unwrap();

        let reloaded = DiskPersistenceController::new(&root);
        assert!(matches!(
            reloaded.load_all().unwrap_err(),
            StoreError::CorruptRecovery(_)
        ));
    }

    #[test]
    fn no_writes_after_stop() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("db");
        let controller = running_controller(&root);

        controller.stop().unwrap();
        let err = controller.flush_entities(&[employee(1, "Bob")]).unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert!(!root.join("Employee").exists());
    }

    #[test]
    fn load_all_twice_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let controller = DiskPersistenceController::new(temp_dir.path().join("db"));
        controller.load_all().unwrap();
        assert!(matches!(
            controller.load_all().unwrap_err(),
            StoreError::Persistence(_)
        ));
    }
}
