//! Record and query types shared by all store backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage key assigned by the store on first save
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey(pub i64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Top-level entity type of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Content node; its bundle is the content type
    Node,
    /// Taxonomy term; its bundle is the vocabulary id
    TaxonomyTerm,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Node => "node",
            EntityType::TaxonomyTerm => "taxonomy_term",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "node" => Some(EntityType::Node),
            "taxonomy_term" => Some(EntityType::TaxonomyTerm),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value held by a named field on a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    /// Entity reference; `None` is an empty (cleared) reference
    Reference(Option<EntityKey>),
    Flag(bool),
}

impl FieldValue {
    /// Text used when matching query conditions
    pub fn match_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Reference(Some(key)) => Some(key.to_string()),
            FieldValue::Reference(None) => None,
            FieldValue::Flag(b) => Some(if *b { "1" } else { "0" }.to_string()),
        }
    }
}

/// A stored (or about to be stored) entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// `None` until the record has been saved once
    pub key: Option<EntityKey>,
    pub entity_type: EntityType,
    pub bundle: String,
    pub title: String,
    pub published: bool,
    pub owner: u32,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// A new, unsaved, published record
    pub fn new(entity_type: EntityType, bundle: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: None,
            entity_type,
            bundle: bundle.into(),
            title: title.into(),
            published: true,
            owner: 1,
            created: now,
            changed: now,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_owner(mut self, owner: u32) -> Self {
        self.owner = owner;
        self
    }

    pub fn is_new(&self) -> bool {
        self.key.is_none()
    }

    pub fn set_text(&mut self, field: &str, value: impl Into<String>) {
        self.fields
            .insert(field.to_string(), FieldValue::Text(value.into()));
    }

    pub fn set_reference(&mut self, field: &str, target: Option<EntityKey>) {
        self.fields
            .insert(field.to_string(), FieldValue::Reference(target));
    }

    pub fn set_flag(&mut self, field: &str, value: bool) {
        self.fields.insert(field.to_string(), FieldValue::Flag(value));
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Target of a reference field; `None` when unset or cleared
    pub fn reference(&self, field: &str) -> Option<EntityKey> {
        match self.fields.get(field) {
            Some(FieldValue::Reference(target)) => *target,
            _ => None,
        }
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.fields.get(field) {
            Some(FieldValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Whether this record satisfies every condition of the query
    pub fn matches(&self, query: &Query) -> bool {
        if self.entity_type != query.entity_type {
            return false;
        }
        if let Some(ref bundle) = query.bundle {
            if &self.bundle != bundle {
                return false;
            }
        }
        if query.published_only && !self.published {
            return false;
        }
        query.conditions.iter().all(|(field, value)| {
            self.fields
                .get(field)
                .and_then(FieldValue::match_text)
                .is_some_and(|v| &v == value)
        })
    }
}

/// Equality query against the store
///
/// Results are always returned in ascending storage-key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub entity_type: EntityType,
    pub bundle: Option<String>,
    pub published_only: bool,
    pub conditions: Vec<(String, String)>,
}

impl Query {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            bundle: None,
            published_only: false,
            conditions: Vec::new(),
        }
    }

    pub fn nodes(bundle: &str) -> Self {
        Self::new(EntityType::Node).bundle(bundle)
    }

    pub fn bundle(mut self, bundle: &str) -> Self {
        self.bundle = Some(bundle.to_string());
        self
    }

    pub fn published(mut self) -> Self {
        self.published_only = true;
        self
    }

    pub fn condition(mut self, field: &str, value: &str) -> Self {
        self.conditions.push((field.to_string(), value.to_string()));
        self
    }
}

/// Record count for one entity type and bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleCount {
    pub entity_type: EntityType,
    pub bundle: String,
    pub published: usize,
    pub total: usize,
}
