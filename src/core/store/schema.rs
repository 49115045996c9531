//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::sqlite::{SqliteStore, SCHEMA_VERSION};
use super::StoreError;

impl SqliteStore {
    /// Create tables on a fresh database, or verify the version of an existing one
    pub(super) fn ensure_schema(&mut self) -> Result<(), StoreError> {
        let has_schema: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;

        if !has_schema {
            return self.init_schema();
        }

        let found: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match found {
            Some(version) if version == SCHEMA_VERSION => Ok(()),
            Some(version) => Err(StoreError::SchemaVersion {
                found: version,
                expected: SCHEMA_VERSION,
            }),
            None => Err(StoreError::Corrupt(
                "schema_version table is empty".to_string(),
            )),
        }
    }

    fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per node or taxonomy term
            CREATE TABLE IF NOT EXISTS entities (
                key INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_type TEXT NOT NULL,
                bundle TEXT NOT NULL,
                title TEXT NOT NULL,
                published INTEGER NOT NULL DEFAULT 1,
                owner INTEGER NOT NULL DEFAULT 1,
                created TEXT NOT NULL,
                changed TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entities_bundle ON entities(entity_type, bundle);

            -- Named field values; match_value is the text compared by queries
            CREATE TABLE IF NOT EXISTS entity_fields (
                entity_key INTEGER NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                match_value TEXT,
                PRIMARY KEY (entity_key, name),
                FOREIGN KEY (entity_key) REFERENCES entities(key) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_entity_fields_match ON entity_fields(name, match_value);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
