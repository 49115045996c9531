//! In-memory entity store

use chrono::Utc;
use std::cell::Cell;
use std::collections::BTreeMap;

use super::{BundleCount, EntityKey, EntityStore, Query, Record, StoreError};

/// Entity store held entirely in memory
///
/// Keys are assigned sequentially from 1, so iteration order equals
/// insertion order. Every trait call is counted in `operations`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<EntityKey, Record>,
    next_key: i64,
    operations: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `query`, `load` and `save` calls made so far
    pub fn operations(&self) -> usize {
        self.operations.get()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in key order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    fn touch(&self) {
        self.operations.set(self.operations.get() + 1);
    }
}

impl EntityStore for MemoryStore {
    fn query(&self, query: &Query) -> Result<Vec<EntityKey>, StoreError> {
        self.touch();
        Ok(self
            .records
            .iter()
            .filter(|(_, record)| record.matches(query))
            .map(|(key, _)| *key)
            .collect())
    }

    fn load(&self, key: EntityKey) -> Result<Option<Record>, StoreError> {
        self.touch();
        Ok(self.records.get(&key).cloned())
    }

    fn save(&mut self, record: &mut Record) -> Result<EntityKey, StoreError> {
        self.touch();
        let key = match record.key {
            Some(key) => {
                if !self.records.contains_key(&key) {
                    return Err(StoreError::Missing(key));
                }
                record.changed = Utc::now();
                key
            }
            None => {
                self.next_key += 1;
                let key = EntityKey(self.next_key);
                record.key = Some(key);
                key
            }
        };
        self.records.insert(key, record.clone());
        Ok(key)
    }

    fn counts(&self) -> Result<Vec<BundleCount>, StoreError> {
        let mut grouped: BTreeMap<(&'static str, &str), BundleCount> = BTreeMap::new();
        for record in self.records.values() {
            let entry = grouped
                .entry((record.entity_type.as_str(), record.bundle.as_str()))
                .or_insert_with(|| BundleCount {
                    entity_type: record.entity_type,
                    bundle: record.bundle.clone(),
                    published: 0,
                    total: 0,
                });
            entry.total += 1;
            if record.published {
                entry.published += 1;
            }
        }
        Ok(grouped.into_values().collect())
    }
}
