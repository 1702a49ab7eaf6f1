use super::Result;
use serde::{Serialize, de::DeserializeOwned};

/// Implemented by every entity the store manages.
///
/// The type name doubles as the per-type subdirectory under the database
/// root, so it must be stable across releases.
pub trait StoredEntity:
    Clone + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const TYPE_NAME: &'static str;

    fn id(&self) -> i32;

    /// Field-level invariants. Re-checked on every record read back from
    /// disk, so a hand-edited file cannot smuggle an invalid entity into
    /// memory.
    fn validate(&self) -> Result<()>;
}
