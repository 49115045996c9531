//! SQLite-backed entity store
//!
//! Records live in two tables: `entities` for the fixed columns and
//! `entity_fields` for the named fields (serialized as JSON). Every save
//! runs in its own transaction and is committed before returning.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{BundleCount, EntityKey, EntityStore, EntityType, FieldValue, Query, Record, StoreError};

/// Current schema version - existing stores with another version are rejected
pub(super) const SCHEMA_VERSION: i32 = 1;

/// The entity store backed by SQLite
pub struct SqliteStore {
    pub(super) conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let mut store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.ensure_schema()?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Open a throwaway store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn, path: None };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Location of the database file (`None` for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_fields(&self, key: EntityKey) -> Result<BTreeMap<String, FieldValue>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM entity_fields WHERE entity_key = ?1 ORDER BY name")?;
        let rows = stmt.query_map(params![key.0], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut fields = BTreeMap::new();
        for row in rows {
            let (name, raw) = row?;
            let value: FieldValue = serde_json::from_str(&raw).map_err(|e| {
                StoreError::Corrupt(format!("field '{}' of record {}: {}", name, key, e))
            })?;
            fields.insert(name, value);
        }
        Ok(fields)
    }
}

fn parse_timestamp(raw: &str, key: EntityKey) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("timestamp of record {}: {}", key, e)))
}

impl EntityStore for SqliteStore {
    fn query(&self, query: &Query) -> Result<Vec<EntityKey>, StoreError> {
        let mut sql = String::from("SELECT e.key FROM entities e WHERE e.entity_type = ?");
        let mut values: Vec<Value> = vec![Value::Text(query.entity_type.as_str().to_string())];

        if let Some(ref bundle) = query.bundle {
            sql.push_str(" AND e.bundle = ?");
            values.push(Value::Text(bundle.clone()));
        }
        if query.published_only {
            sql.push_str(" AND e.published = 1");
        }
        for (field, value) in &query.conditions {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM entity_fields f \
                 WHERE f.entity_key = e.key AND f.name = ? AND f.match_value = ?)",
            );
            values.push(Value::Text(field.clone()));
            values.push(Value::Text(value.clone()));
        }
        sql.push_str(" ORDER BY e.key");

        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, i64>(0))?
            .map(|r| r.map(EntityKey))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn load(&self, key: EntityKey) -> Result<Option<Record>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT entity_type, bundle, title, published, owner, created, changed
                 FROM entities WHERE key = ?1",
                params![key.0],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((entity_type, bundle, title, published, owner, created, changed)) = row else {
            return Ok(None);
        };

        let entity_type = EntityType::parse(&entity_type).ok_or_else(|| {
            StoreError::Corrupt(format!("unknown entity type '{}' on record {}", entity_type, key))
        })?;

        Ok(Some(Record {
            key: Some(key),
            entity_type,
            bundle,
            title,
            published,
            owner,
            created: parse_timestamp(&created, key)?,
            changed: parse_timestamp(&changed, key)?,
            fields: self.load_fields(key)?,
        }))
    }

    fn save(&mut self, record: &mut Record) -> Result<EntityKey, StoreError> {
        let tx = self.conn.transaction()?;

        let key = match record.key {
            Some(key) => {
                record.changed = Utc::now();
                let updated = tx.execute(
                    "UPDATE entities SET entity_type = ?1, bundle = ?2, title = ?3,
                         published = ?4, owner = ?5, changed = ?6
                     WHERE key = ?7",
                    params![
                        record.entity_type.as_str(),
                        record.bundle,
                        record.title,
                        record.published,
                        record.owner,
                        record.changed.to_rfc3339(),
                        key.0
                    ],
                )?;
                if updated == 0 {
                    return Err(StoreError::Missing(key));
                }
                tx.execute(
                    "DELETE FROM entity_fields WHERE entity_key = ?1",
                    params![key.0],
                )?;
                key
            }
            None => {
                tx.execute(
                    "INSERT INTO entities (entity_type, bundle, title, published, owner, created, changed)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.entity_type.as_str(),
                        record.bundle,
                        record.title,
                        record.published,
                        record.owner,
                        record.created.to_rfc3339(),
                        record.changed.to_rfc3339()
                    ],
                )?;
                EntityKey(tx.last_insert_rowid())
            }
        };

        {
            let mut insert = tx.prepare(
                "INSERT INTO entity_fields (entity_key, name, value, match_value)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (name, value) in &record.fields {
                let raw = serde_json::to_string(value)
                    .map_err(|e| StoreError::Corrupt(format!("field '{}': {}", name, e)))?;
                insert.execute(params![key.0, name, raw, value.match_text()])?;
            }
        }

        tx.commit()?;
        record.key = Some(key);
        Ok(key)
    }

    fn counts(&self) -> Result<Vec<BundleCount>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT entity_type, bundle, SUM(published), COUNT(*)
             FROM entities GROUP BY entity_type, bundle ORDER BY entity_type, bundle",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (entity_type, bundle, published, total) = row?;
            let entity_type = EntityType::parse(&entity_type).ok_or_else(|| {
                StoreError::Corrupt(format!("unknown entity type '{}'", entity_type))
            })?;
            counts.push(BundleCount {
                entity_type,
                bundle,
                published: published as usize,
                total: total as usize,
            });
        }
        Ok(counts)
    }
}
