//! Entity store abstraction
//!
//! Importers never talk to a concrete database. They receive an
//! `EntityStore` and use only the operations below:
//! - `query` / `find_by_field` for natural-key and reference lookups
//! - `load` to fetch an existing record
//! - `create` to construct an unsaved record
//! - `save` to insert or update a record (committed immediately)
//!
//! Two backends are provided: `SqliteStore` for persistent project stores
//! and `MemoryStore` for tests and embedding.

mod memory;
mod schema;
mod sqlite;
mod types;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::*;

use miette::Diagnostic;
use thiserror::Error;

/// Operations the importers need from an entity store
pub trait EntityStore {
    /// Keys of all records matching the query, in ascending key order
    fn query(&self, query: &Query) -> Result<Vec<EntityKey>, StoreError>;

    /// Load a record by key; `None` if no such record exists
    fn load(&self, key: EntityKey) -> Result<Option<Record>, StoreError>;

    /// Insert a new record or update an existing one, returning its key
    ///
    /// New records get their key assigned here.
    fn save(&mut self, record: &mut Record) -> Result<EntityKey, StoreError>;

    /// Construct a new, unsaved record
    fn create(&self, entity_type: EntityType, bundle: &str, title: &str) -> Record {
        Record::new(entity_type, bundle, title)
    }

    /// First key whose `field` equals `value`
    ///
    /// When several records match, the lowest key wins.
    fn find_by_field(
        &self,
        entity_type: EntityType,
        bundle: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<EntityKey>, StoreError> {
        let query = Query::new(entity_type)
            .bundle(bundle)
            .condition(field, value);
        Ok(self.query(&query)?.into_iter().next())
    }

    /// Load a record that is known to exist
    fn load_existing(&self, key: EntityKey) -> Result<Record, StoreError> {
        self.load(key)?.ok_or(StoreError::Missing(key))
    }

    /// Record counts grouped by entity type and bundle
    fn counts(&self) -> Result<Vec<BundleCount>, StoreError>;
}

/// Errors raised by store backends
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("store database error: {0}")]
    #[diagnostic(code(nutri::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("record {0} does not exist")]
    #[diagnostic(code(nutri::store::missing))]
    Missing(EntityKey),

    #[error("store schema version {found} is not supported (expected {expected})")]
    #[diagnostic(
        code(nutri::store::schema_version),
        help("the store was written by a different version of nutri; import into a fresh store")
    )]
    SchemaVersion { found: i32, expected: i32 },

    #[error("store data is corrupt: {0}")]
    #[diagnostic(code(nutri::store::corrupt))]
    Corrupt(String),

    #[error("failed to prepare store location: {0}")]
    #[diagnostic(code(nutri::store::io))]
    Io(#[from] std::io::Error),
}
