pub mod access;
pub mod collection;
pub mod persistence;
pub mod store;

pub use access::EntityAccess;
pub use collection::ChangeTrackingCollection;
pub use persistence::{CURRENT_SCHEMA_VERSION, DiskPersistenceController, LoadedCollections};
pub use store::EntityStore;
